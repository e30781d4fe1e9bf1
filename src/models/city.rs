use serde::{Deserialize, Serialize};

/// A location the prayer-time source can be queried for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    /// Name sent to the source (ASCII).
    pub name: String,
    pub country: String,
    /// Name shown to the user.
    pub label: String,
}

impl City {
    pub fn new(name: &str, country: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            country: country.to_string(),
            label: label.to_string(),
        }
    }

    /// Identity used to key cached schedules.
    pub fn key(&self) -> String {
        format!("{}/{}", self.country, self.name)
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.label.to_lowercase().contains(&query)
            || self.name.to_lowercase().contains(&query)
    }
}

impl Default for City {
    fn default() -> Self {
        City::new(DEFAULT_CITY, TURKEY, "İstanbul")
    }
}

pub const DEFAULT_CITY: &str = "Istanbul";
const TURKEY: &str = "Turkey";

/// (source name, label) for the 81 provinces of Turkey.
const PROVINCES: &[(&str, &str)] = &[
    ("Adana", "Adana"),
    ("Adiyaman", "Adıyaman"),
    ("Afyonkarahisar", "Afyonkarahisar"),
    ("Agri", "Ağrı"),
    ("Aksaray", "Aksaray"),
    ("Amasya", "Amasya"),
    ("Ankara", "Ankara"),
    ("Antalya", "Antalya"),
    ("Ardahan", "Ardahan"),
    ("Artvin", "Artvin"),
    ("Aydin", "Aydın"),
    ("Balikesir", "Balıkesir"),
    ("Bartin", "Bartın"),
    ("Batman", "Batman"),
    ("Bayburt", "Bayburt"),
    ("Bilecik", "Bilecik"),
    ("Bingol", "Bingöl"),
    ("Bitlis", "Bitlis"),
    ("Bolu", "Bolu"),
    ("Burdur", "Burdur"),
    ("Bursa", "Bursa"),
    ("Canakkale", "Çanakkale"),
    ("Cankiri", "Çankırı"),
    ("Corum", "Çorum"),
    ("Denizli", "Denizli"),
    ("Diyarbakir", "Diyarbakır"),
    ("Duzce", "Düzce"),
    ("Edirne", "Edirne"),
    ("Elazig", "Elazığ"),
    ("Erzincan", "Erzincan"),
    ("Erzurum", "Erzurum"),
    ("Eskisehir", "Eskişehir"),
    ("Gaziantep", "Gaziantep"),
    ("Giresun", "Giresun"),
    ("Gumushane", "Gümüşhane"),
    ("Hakkari", "Hakkari"),
    ("Hatay", "Hatay"),
    ("Igdir", "Iğdır"),
    ("Isparta", "Isparta"),
    ("Istanbul", "İstanbul"),
    ("Izmir", "İzmir"),
    ("Kahramanmaras", "Kahramanmaraş"),
    ("Karabuk", "Karabük"),
    ("Karaman", "Karaman"),
    ("Kars", "Kars"),
    ("Kastamonu", "Kastamonu"),
    ("Kayseri", "Kayseri"),
    ("Kirikkale", "Kırıkkale"),
    ("Kirklareli", "Kırklareli"),
    ("Kirsehir", "Kırşehir"),
    ("Kilis", "Kilis"),
    ("Kocaeli", "Kocaeli"),
    ("Konya", "Konya"),
    ("Kutahya", "Kütahya"),
    ("Malatya", "Malatya"),
    ("Manisa", "Manisa"),
    ("Mardin", "Mardin"),
    ("Mersin", "Mersin"),
    ("Mugla", "Muğla"),
    ("Mus", "Muş"),
    ("Nevsehir", "Nevşehir"),
    ("Nigde", "Niğde"),
    ("Ordu", "Ordu"),
    ("Osmaniye", "Osmaniye"),
    ("Rize", "Rize"),
    ("Sakarya", "Sakarya"),
    ("Samsun", "Samsun"),
    ("Sanliurfa", "Şanlıurfa"),
    ("Siirt", "Siirt"),
    ("Sinop", "Sinop"),
    ("Sirnak", "Şırnak"),
    ("Sivas", "Sivas"),
    ("Tekirdag", "Tekirdağ"),
    ("Tokat", "Tokat"),
    ("Trabzon", "Trabzon"),
    ("Tunceli", "Tunceli"),
    ("Usak", "Uşak"),
    ("Van", "Van"),
    ("Yalova", "Yalova"),
    ("Yozgat", "Yozgat"),
    ("Zonguldak", "Zonguldak"),
];

pub fn builtin_cities() -> Vec<City> {
    PROVINCES
        .iter()
        .map(|(name, label)| City::new(name, TURKEY, label))
        .collect()
}

pub fn search(cities: &[City], query: &str) -> Vec<City> {
    cities.iter().filter(|c| c.matches(query)).cloned().collect()
}

/// Looks a city up by source name or label, ignoring case.
pub fn find(cities: &[City], name: &str) -> Option<City> {
    let needle = name.trim().to_lowercase();
    cities
        .iter()
        .find(|c| c.name.to_lowercase() == needle || c.label.to_lowercase() == needle)
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_every_province() {
        let cities = builtin_cities();
        assert_eq!(cities.len(), 81);
        assert!(cities.iter().all(|c| c.country == "Turkey"));
        assert!(cities.contains(&City::default()));
    }

    #[test]
    fn search_matches_label_and_source_name() {
        let cities = builtin_cities();
        let hits = search(&cities, "şehir");
        let names: Vec<_> = hits.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Eskisehir", "Kirsehir", "Nevsehir"]);

        let hits = search(&cities, "istanbul");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].label, "İstanbul");

        assert_eq!(search(&cities, "  ").len(), 81);
    }

    #[test]
    fn find_by_label_or_name() {
        let cities = builtin_cities();
        assert_eq!(find(&cities, "Izmir").unwrap().label, "İzmir");
        assert_eq!(find(&cities, "Çorum").unwrap().name, "Corum");
        assert!(find(&cities, "Atlantis").is_none());
    }
}
