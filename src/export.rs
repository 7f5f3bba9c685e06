//! CSV export of orders, for the admin-only `/export` command.

use chrono::FixedOffset;

use crate::error::ExportError;
use crate::models::{Balcony, StoredOrder};

/// Fixed timezone for rendered timestamps (UTC+3).
fn export_offset() -> FixedOffset {
    FixedOffset::east_opt(3 * 3600).expect("valid fixed offset")
}

const HEADERS: [&str; 20] = [
    "ID",
    "CreatedAt",
    "Entrance",
    "Floor",
    "Apartment",
    "WindowsSame",
    "Windows3",
    "Windows4",
    "Windows5",
    "Windows6_7",
    "BalconyCount",
    "BalconyGlazing",
    "BalconySash",
    "Price",
    "Status",
    "IsCurrent",
    "UserID",
    "Username",
    "FirstName",
    "LastName",
];

/// Render orders as a CSV document.
pub fn to_csv(orders: &[StoredOrder]) -> Result<Vec<u8>, ExportError> {
    let offset = export_offset();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;

    for order in orders {
        let (glazing, sash) = match order.balcony {
            Balcony::None => ("", ""),
            Balcony::Glazed { glazing, sash, .. } => (glazing.tag(), sash.tag()),
        };
        writer.write_record([
            order.id.to_string(),
            order
                .created_at
                .with_timezone(&offset)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            order.entrance.to_string(),
            order.floor.to_string(),
            order.apartment.clone(),
            order.windows_same.to_string(),
            order.counts.three.to_string(),
            order.counts.four.to_string(),
            order.counts.five.to_string(),
            order.counts.six_seven.to_string(),
            order.balcony.count().to_string(),
            glazing.to_string(),
            sash.to_string(),
            order.price.to_string(),
            order.status.to_string(),
            order.is_current.to_string(),
            order.user.telegram_id.to_string(),
            order.user.username.clone(),
            order.user.first_name.clone(),
            order.user.last_name.clone(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::IntoInner(e.to_string()))
}

/// File name for the exported report, e.g. `orders_current_2026-08-25.csv`.
pub fn file_name(only_current: bool, today: chrono::NaiveDate) -> String {
    let scope = if only_current { "current" } else { "all" };
    format!("orders_{scope}_{}.csv", today.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::models::{Glazing, OrderStatus, SashClass, SashCounts, User};

    fn sample_order() -> StoredOrder {
        StoredOrder {
            id: 12,
            user_id: 1,
            entrance: 2,
            floor: 10,
            apartment: "305".into(),
            windows_same: false,
            counts: SashCounts {
                three: 1,
                four: 0,
                five: 2,
                six_seven: 0,
            },
            balcony: Balcony::Glazed {
                count: 1,
                glazing: Glazing::Standard,
                sash: SashClass::Five,
            },
            nickname: Some("@alice".into()),
            price: 7000,
            status: OrderStatus::Confirmed,
            is_current: true,
            created_at: Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap(),
            user: User {
                telegram_id: 1,
                username: "alice".into(),
                first_name: "Alice".into(),
                last_name: "Smith".into(),
            },
        }
    }

    #[test]
    fn header_row_matches_contract() {
        let csv = String::from_utf8(to_csv(&[]).unwrap()).unwrap();
        assert_eq!(
            csv.trim_end(),
            "ID,CreatedAt,Entrance,Floor,Apartment,WindowsSame,Windows3,Windows4,\
             Windows5,Windows6_7,BalconyCount,BalconyGlazing,BalconySash,Price,\
             Status,IsCurrent,UserID,Username,FirstName,LastName"
        );
    }

    #[test]
    fn row_renders_all_fields() {
        let csv = String::from_utf8(to_csv(&[sample_order()]).unwrap()).unwrap();
        let row = csv.lines().nth(1).unwrap();
        // 12:00 UTC rendered at UTC+3
        assert_eq!(
            row,
            "12,2026-08-25 15:00:00,2,10,305,false,1,0,2,0,1,standard,5,7000,\
             confirmed,true,1,alice,Alice,Smith"
        );
    }

    #[test]
    fn no_balcony_leaves_glazing_and_sash_empty() {
        let mut order = sample_order();
        order.balcony = Balcony::None;
        let csv = String::from_utf8(to_csv(&[order]).unwrap()).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains(",0,,,7000,"));
    }

    #[test]
    fn file_name_reflects_scope_and_date() {
        let today = chrono::NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        assert_eq!(file_name(true, today), "orders_current_2026-08-25.csv");
        assert_eq!(file_name(false, today), "orders_all_2026-08-25.csv");
    }
}
