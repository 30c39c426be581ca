//! Default session fleet.

use crate::train::{Train, TrainStatus};

/// The five-train fleet every session starts from (`T001..T005`).
pub fn default_fleet() -> Vec<Train> {
    vec![
        Train::new("T001", "Rajdhani Express", "Delhi - Mumbai", 130.0)
            .with_speed(120.0)
            .with_next_stop("Agra", "14:30"),
        Train::new("T002", "Shatabdi Express", "Delhi - Chandigarh", 120.0)
            .with_speed(110.0)
            .with_delay(5.0, TrainStatus::Delayed)
            .with_next_stop("Panipat", "15:45"),
        Train::new("T003", "Duronto Express", "Mumbai - Pune", 110.0)
            .with_speed(95.0)
            .with_next_stop("Lonavala", "16:20"),
        Train::new("T004", "Garib Rath", "Kolkata - Delhi", 100.0)
            .with_delay(15.0, TrainStatus::Delayed)
            .with_next_stop("Allahabad", "18:30"),
        Train::new("T005", "Vande Bharat", "Delhi - Varanasi", 160.0)
            .with_speed(125.0)
            .with_next_stop("Kanpur", "17:15"),
    ]
}
