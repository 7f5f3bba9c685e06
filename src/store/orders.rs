//! Order storage — supersede/clarification semantics and the export query.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use tracing::{info, warn};

use crate::error::DatabaseError;
use crate::models::{
    Balcony, Glazing, NewOrder, OrderStatus, SashClass, SashCounts, StoredOrder, User,
};
use crate::store::Database;

/// How a confirmed order landed in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Saved as confirmed and current. `superseded` is true when the
    /// submitter's own prior current order for the unit was demoted.
    Confirmed { superseded: bool },
    /// A confirmed current order from another user already covers this
    /// unit; the new order was parked for admin reconciliation.
    NeedsClarification,
}

/// CRUD operations for orders.
pub struct OrderStore;

impl OrderStore {
    /// Persist a confirmed order atomically.
    ///
    /// In one transaction: detect a confirmed current order for the same
    /// (entrance, floor, apartment) from a different user and park the new
    /// order as `needs_clarification`; otherwise demote the submitter's own
    /// prior current order and insert the new one as confirmed + current.
    /// Keeps the invariant that at most one order per unit is confirmed and
    /// current.
    pub fn save(db: &Database, order: &NewOrder) -> Result<SaveOutcome, DatabaseError> {
        if order.apartment.is_empty() {
            return Err(DatabaseError::IncompleteOrder("empty apartment".into()));
        }

        let mut conn = db.conn();
        let tx = conn.transaction()?;

        let conflicting: bool = tx.query_row(
            "SELECT EXISTS(
                 SELECT 1 FROM orders
                 WHERE entrance = ?1 AND floor = ?2 AND apartment = ?3
                   AND is_current = 1 AND status = 'confirmed'
                   AND user_id != ?4)",
            rusqlite::params![order.entrance, order.floor, order.apartment, order.user_id],
            |row| row.get(0),
        )?;

        let outcome = if conflicting {
            insert_order(&tx, order, OrderStatus::NeedsClarification, false)?;
            warn!(
                user_id = order.user_id,
                entrance = order.entrance,
                floor = order.floor,
                apartment = %order.apartment,
                "Conflicting confirmed order exists; parked for clarification"
            );
            SaveOutcome::NeedsClarification
        } else {
            let demoted = tx.execute(
                "UPDATE orders SET is_current = 0
                 WHERE user_id = ?1 AND entrance = ?2 AND floor = ?3 AND apartment = ?4
                   AND is_current = 1",
                rusqlite::params![order.user_id, order.entrance, order.floor, order.apartment],
            )?;
            insert_order(&tx, order, OrderStatus::Confirmed, true)?;
            SaveOutcome::Confirmed {
                superseded: demoted > 0,
            }
        };

        tx.commit()?;
        info!(
            user_id = order.user_id,
            price = order.price,
            outcome = ?outcome,
            "Order saved"
        );
        Ok(outcome)
    }

    /// Orders joined with their users, newest first, optionally
    /// restricted to current ones.
    pub fn for_export(
        db: &Database,
        only_current: bool,
    ) -> Result<Vec<StoredOrder>, DatabaseError> {
        let conn = db.conn();
        let mut stmt = conn.prepare(
            "SELECT o.id, o.user_id, o.entrance, o.floor, o.apartment,
                    o.windows_same, o.window_3_count, o.window_4_count,
                    o.window_5_count, o.window_6_7_count,
                    o.balcony_count, o.balcony_glazing, o.balcony_sash,
                    o.nickname, o.price, o.status, o.is_current, o.created_at,
                    u.username, u.first_name, u.last_name
             FROM orders o
             JOIN users u ON o.user_id = u.telegram_id
             WHERE ?1 = 0 OR o.is_current = 1
             ORDER BY o.created_at DESC, o.id DESC",
        )?;
        let rows = stmt.query_map([only_current as i64], row_to_order)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

fn insert_order(
    tx: &rusqlite::Transaction<'_>,
    order: &NewOrder,
    status: OrderStatus,
    is_current: bool,
) -> Result<(), DatabaseError> {
    let counts = order.windows.counts();
    let (balcony_count, balcony_glazing, balcony_sash) = match order.balcony {
        Balcony::None => (0u8, None, None),
        Balcony::Glazed {
            count,
            glazing,
            sash,
        } => (count, Some(glazing.tag()), Some(sash.tag())),
    };

    tx.execute(
        "INSERT INTO orders
             (user_id, entrance, floor, apartment, windows_same,
              window_3_count, window_4_count, window_5_count, window_6_7_count,
              balcony_count, balcony_glazing, balcony_sash,
              nickname, price, status, is_current, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        rusqlite::params![
            order.user_id,
            order.entrance,
            order.floor,
            order.apartment,
            order.windows.is_same(),
            counts.three,
            counts.four,
            counts.five,
            counts.six_seven,
            balcony_count,
            balcony_glazing,
            balcony_sash,
            order.nickname,
            order.price,
            status.as_str(),
            is_current,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn row_to_order(row: &Row<'_>) -> rusqlite::Result<StoredOrder> {
    let balcony_count: u8 = row.get(10)?;
    let balcony = if balcony_count == 0 {
        Balcony::None
    } else {
        let glazing: Option<String> = row.get(11)?;
        let sash: Option<String> = row.get(12)?;
        Balcony::Glazed {
            count: balcony_count,
            glazing: glazing
                .as_deref()
                .and_then(Glazing::from_tag)
                .unwrap_or(Glazing::Standard),
            sash: sash
                .as_deref()
                .and_then(SashClass::from_tag)
                .unwrap_or(SashClass::Three),
        }
    };

    let created_at: String = row.get(17)?;
    let status: String = row.get(15)?;

    Ok(StoredOrder {
        id: row.get(0)?,
        user_id: row.get(1)?,
        entrance: row.get(2)?,
        floor: row.get(3)?,
        apartment: row.get(4)?,
        windows_same: row.get(5)?,
        counts: SashCounts {
            three: row.get(6)?,
            four: row.get(7)?,
            five: row.get(8)?,
            six_seven: row.get(9)?,
        },
        balcony,
        nickname: row.get(13)?,
        price: row.get(14)?,
        status: OrderStatus::from_str(&status).unwrap_or(OrderStatus::Canceled),
        is_current: row.get(16)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default(),
        user: User {
            telegram_id: row.get(1)?,
            username: row.get(18)?,
            first_name: row.get(19)?,
            last_name: row.get(20)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WindowConfig;
    use crate::store::UserStore;

    fn seeded_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        for (id, name) in [(1, "alice"), (2, "bob")] {
            UserStore::upsert(
                &db,
                &User {
                    telegram_id: id,
                    username: name.into(),
                    first_name: name.into(),
                    last_name: String::new(),
                },
            )
            .unwrap();
        }
        db
    }

    fn order_for(user_id: i64, apartment: &str, price: i64) -> NewOrder {
        NewOrder {
            user_id,
            entrance: 2,
            floor: 10,
            apartment: apartment.into(),
            windows: WindowConfig::Same {
                class: SashClass::Four,
                count: 3,
            },
            balcony: Balcony::None,
            nickname: None,
            price,
        }
    }

    #[test]
    fn first_order_is_confirmed_and_current() {
        let db = seeded_db();
        let outcome = OrderStore::save(&db, &order_for(1, "305", 4500)).unwrap();
        assert_eq!(outcome, SaveOutcome::Confirmed { superseded: false });

        let orders = OrderStore::for_export(&db, true).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::Confirmed);
        assert!(orders[0].is_current);
        assert_eq!(orders[0].user.username, "alice");
    }

    #[test]
    fn resubmission_supersedes_own_prior_order() {
        let db = seeded_db();
        OrderStore::save(&db, &order_for(1, "305", 4500)).unwrap();
        let outcome = OrderStore::save(&db, &order_for(1, "305", 6000)).unwrap();
        assert_eq!(outcome, SaveOutcome::Confirmed { superseded: true });

        let all = OrderStore::for_export(&db, false).unwrap();
        assert_eq!(all.len(), 2);
        // Exactly one current+confirmed order remains, the newer one.
        let current: Vec<_> = all
            .iter()
            .filter(|o| o.is_current && o.status == OrderStatus::Confirmed)
            .collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].price, 6000);

        // The superseded order is retained for history.
        let superseded = all.iter().find(|o| o.price == 4500).unwrap();
        assert!(!superseded.is_current);
        assert_eq!(superseded.status, OrderStatus::Confirmed);
    }

    #[test]
    fn conflicting_order_from_other_user_needs_clarification() {
        let db = seeded_db();
        OrderStore::save(&db, &order_for(1, "305", 4500)).unwrap();
        let outcome = OrderStore::save(&db, &order_for(2, "305", 7000)).unwrap();
        assert_eq!(outcome, SaveOutcome::NeedsClarification);

        let all = OrderStore::for_export(&db, false).unwrap();
        let first = all.iter().find(|o| o.user_id == 1).unwrap();
        let second = all.iter().find(|o| o.user_id == 2).unwrap();

        // Prior order is untouched; the new one is parked, non-current.
        assert!(first.is_current);
        assert_eq!(first.status, OrderStatus::Confirmed);
        assert!(!second.is_current);
        assert_eq!(second.status, OrderStatus::NeedsClarification);
    }

    #[test]
    fn different_apartment_is_not_a_conflict() {
        let db = seeded_db();
        OrderStore::save(&db, &order_for(1, "305", 4500)).unwrap();
        let outcome = OrderStore::save(&db, &order_for(2, "306", 4500)).unwrap();
        assert_eq!(outcome, SaveOutcome::Confirmed { superseded: false });
    }

    #[test]
    fn export_filter_hides_superseded_orders() {
        let db = seeded_db();
        OrderStore::save(&db, &order_for(1, "305", 4500)).unwrap();
        OrderStore::save(&db, &order_for(1, "305", 6000)).unwrap();

        assert_eq!(OrderStore::for_export(&db, true).unwrap().len(), 1);
        assert_eq!(OrderStore::for_export(&db, false).unwrap().len(), 2);
    }

    #[test]
    fn balcony_and_nickname_roundtrip_through_storage() {
        let db = seeded_db();
        let mut order = order_for(1, "12", 9000);
        order.balcony = Balcony::Glazed {
            count: 2,
            glazing: Glazing::FloorToCeiling,
            sash: SashClass::SixSeven,
        };
        order.nickname = Some("@alice".into());
        OrderStore::save(&db, &order).unwrap();

        let stored = &OrderStore::for_export(&db, true).unwrap()[0];
        assert_eq!(
            stored.balcony,
            Balcony::Glazed {
                count: 2,
                glazing: Glazing::FloorToCeiling,
                sash: SashClass::SixSeven,
            }
        );
        assert_eq!(stored.nickname.as_deref(), Some("@alice"));
        assert!(stored.windows_same);
        assert_eq!(stored.counts.four, 3);
    }

    #[test]
    fn empty_apartment_is_rejected() {
        let db = seeded_db();
        let order = order_for(1, "", 100);
        assert!(matches!(
            OrderStore::save(&db, &order),
            Err(DatabaseError::IncompleteOrder(_))
        ));
    }
}
