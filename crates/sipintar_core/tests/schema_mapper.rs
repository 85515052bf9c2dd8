use serde_json::json;
use sipintar_core::mapper::{from_storage, to_storage, MapError};
use sipintar_core::model::seed;
use sipintar_core::{Account, Announcement, Entity, Resident, Transaction};

fn assert_total<E: Entity>(sample: &E) {
    let domain = serde_json::to_value(sample).unwrap();
    E::SCHEMA.check_total(&domain).unwrap();
}

#[test]
fn every_entity_table_covers_its_fields() {
    let mut resident = seed::residents().remove(0);
    resident.photo_url = Some("https://cdn.example/p.png".to_string());
    assert_total(&resident);
    assert_total(&seed::transactions()[0]);
    assert_total(&seed::announcements()[0]);
    assert_total(&seed::accounts()[0]);
}

#[test]
fn resident_round_trips_through_storage_shape() {
    let mut resident = seed::residents().remove(1);
    resident.kk_number = "3171010000000002".to_string();
    resident.photo_url = Some("https://cdn.example/siti.png".to_string());

    let row = to_storage(&resident).unwrap();
    assert_eq!(row["kk_number"], json!("3171010000000002"));
    assert_eq!(row["status"], json!("Kawin"));
    assert_eq!(row["photo_url"], json!("https://cdn.example/siti.png"));
    assert!(row.get("kkNumber").is_none());
    assert!(row.get("maritalStatus").is_none());

    assert_eq!(from_storage::<Resident>(&row).unwrap(), resident);
}

#[test]
fn announcement_flag_uses_snake_case_column() {
    let announcement = seed::announcements().remove(1);
    let row = to_storage(&announcement).unwrap();
    assert_eq!(row["is_ai_generated"], json!(true));
    assert_eq!(from_storage::<Announcement>(&row).unwrap(), announcement);
}

#[test]
fn transaction_and_account_map_by_identity() {
    let transaction = seed::transactions().remove(2);
    let row = to_storage(&transaction).unwrap();
    assert_eq!(row["type"], json!("EXPENSE"));
    assert_eq!(row["amount"], json!(150_000));
    assert_eq!(from_storage::<Transaction>(&row).unwrap(), transaction);

    let account = seed::accounts().remove(0);
    assert_eq!(
        from_storage::<Account>(&to_storage(&account).unwrap()).unwrap(),
        account
    );
}

#[test]
fn null_and_unknown_columns_are_tolerated_on_read() {
    let row = json!({
        "id": "9",
        "nik": "123",
        "kk_number": null,
        "name": "Dewi",
        "gender": "Perempuan",
        "birth_date": null,
        "status": "Belum Kawin",
        "photo_url": null,
        "created_at": "2024-01-01T00:00:00Z"
    });

    let resident = from_storage::<Resident>(&row).unwrap();
    assert_eq!(resident.kk_number, "");
    assert_eq!(resident.birth_date, None);
    assert_eq!(resident.photo_url, None);
}

#[test]
fn non_object_row_is_rejected() {
    let err = from_storage::<Transaction>(&json!(["T1"])).unwrap_err();
    assert!(matches!(err, MapError::NotAnObject { .. }));
}
