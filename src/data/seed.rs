//! Built-in reference districts
//!
//! Upserted at startup when `database.seed_districts` is enabled.

use super::models::DistrictSeed;

const fn district(
    district_id: &'static str,
    name: &'static str,
    state: &'static str,
    latitude: f64,
    longitude: f64,
) -> DistrictSeed {
    DistrictSeed {
        district_id,
        name,
        state,
        latitude,
        longitude,
    }
}

pub const REFERENCE_DISTRICTS: &[DistrictSeed] = &[
    // Maharashtra
    district("pune", "Pune", "Maharashtra", 18.5204, 73.8567),
    district("mumbai", "Mumbai", "Maharashtra", 19.0760, 72.8777),
    district("nagpur", "Nagpur", "Maharashtra", 21.1458, 79.0882),
    district("nashik", "Nashik", "Maharashtra", 20.0059, 73.7910),
    // Karnataka
    district("bangalore-urban", "Bangalore Urban", "Karnataka", 12.9716, 77.5946),
    district("mysore", "Mysore", "Karnataka", 12.2958, 76.6394),
    district("belgaum", "Belgaum", "Karnataka", 15.8497, 74.4977),
    // Rajasthan
    district("jaipur", "Jaipur", "Rajasthan", 26.9124, 75.7873),
    district("udaipur", "Udaipur", "Rajasthan", 24.5854, 73.7125),
    district("jodhpur", "Jodhpur", "Rajasthan", 26.2389, 73.0243),
    // Uttar Pradesh
    district("lucknow", "Lucknow", "Uttar Pradesh", 26.8467, 80.9462),
    district("varanasi", "Varanasi", "Uttar Pradesh", 25.3176, 82.9739),
    district("kanpur", "Kanpur", "Uttar Pradesh", 26.4499, 80.3319),
    district("patna", "Patna", "Bihar", 25.5941, 85.1376),
    district("ahmedabad", "Ahmedabad", "Gujarat", 23.0225, 72.5714),
    district("hyderabad", "Hyderabad", "Telangana", 17.3850, 78.4867),
    district("chennai", "Chennai", "Tamil Nadu", 13.0827, 80.2707),
    district("kolkata", "Kolkata", "West Bengal", 22.5726, 88.3639),
    district("bhopal", "Bhopal", "Madhya Pradesh", 23.2599, 77.4126),
    district("chandigarh", "Chandigarh", "Chandigarh", 30.7333, 76.7794),
];
