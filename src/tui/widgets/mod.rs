pub mod city_picker;
pub mod header;
pub mod next_prayer;
pub mod notifications;
pub mod prayers;
pub mod statusbar;
