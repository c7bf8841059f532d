use cadence::Location;

/// A city with a known CityBikes network.
#[derive(Debug, Clone, Copy)]
pub struct City {
    pub name: &'static str,
    pub network_id: &'static str,
    pub center: Location,
}

/// Built-in cities and the CityBikes networks that serve them.
pub const CITIES: &[City] = &[
    City {
        name: "Milan",
        network_id: "bikemi",
        center: Location {
            longitude: 9.1865,
            latitude: 45.4654,
        },
    },
    City {
        name: "Los Angeles",
        network_id: "metro-bike-share",
        center: Location {
            longitude: -118.2437,
            latitude: 34.0522,
        },
    },
    City {
        name: "Mexico City",
        network_id: "ecobici",
        center: Location {
            longitude: -99.1332,
            latitude: 19.4326,
        },
    },
    City {
        name: "New York",
        network_id: "citi-bike-nyc",
        center: Location {
            longitude: -74.0060,
            latitude: 40.7128,
        },
    },
    City {
        name: "Paris",
        network_id: "velib",
        center: Location {
            longitude: 2.3522,
            latitude: 48.8566,
        },
    },
    City {
        name: "Montreal",
        network_id: "bixi-montreal",
        center: Location {
            longitude: -73.5539,
            latitude: 45.5086,
        },
    },
    City {
        name: "Washington DC",
        network_id: "capital-bikeshare",
        center: Location {
            longitude: -77.0369,
            latitude: 38.9072,
        },
    },
];

/// Look up a built-in city by name, case-insensitively.
pub fn find_city(name: &str) -> Option<&'static City> {
    CITIES
        .iter()
        .find(|city| city.name.eq_ignore_ascii_case(name))
}
