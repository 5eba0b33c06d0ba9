// src/seed.rs

use crate::models::{Department, FieldManager};

/// Demo roster installed on an empty store.
pub fn demo_field_managers() -> Vec<FieldManager> {
    let rows: [(&str, &str, &str, Department, u32); 4] = [
        ("field001", "Rajesh Kumar", "Banjara Hills", Department::Electrical, 3),
        ("field002", "Priya Sharma", "Jubilee Hills", Department::RoadMaintenance, 2),
        ("field003", "Mohammed Ali", "Madhapur", Department::WasteManagement, 4),
        ("field004", "Lakshmi Reddy", "Gachibowli", Department::WaterSupply, 1),
    ];

    rows.into_iter()
        .map(|(id, name, area, department, workload)| FieldManager {
            id: id.to_string(),
            name: name.to_string(),
            department,
            area: area.to_string(),
            workload,
            active: true,
        })
        .collect()
}
