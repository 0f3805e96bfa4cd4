//! PostgreSQL store tests
//!
//! Ignored by default: they need a database reachable through DATABASE_URL.
//! Run with: cargo test --test postgres_tests -- --ignored

use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use rentrack_server::{
    models::{CreateEquipment, EquipmentCondition, EquipmentStatus, RentalStatus},
    repository::Repository,
    services::{InventoryService, RentalRules},
    AppError,
};

async fn setup() -> (InventoryService, Repository, i64) {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    let login = format!("borrower-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default());
    let user_id: i64 = sqlx::query_scalar("INSERT INTO users (login) VALUES ($1) RETURNING id")
        .bind(&login)
        .fetch_one(&pool)
        .await
        .expect("Failed to create borrower");

    let repository = Repository::new(pool, 2000);
    let service = InventoryService::new(
        Arc::new(repository.clone()),
        Arc::new(repository.users.clone()),
        RentalRules::default(),
    );
    (service, repository, user_id)
}

fn unique_camera() -> CreateEquipment {
    CreateEquipment {
        name: "Camera".to_string(),
        category: "Video".to_string(),
        serial_number: format!("CAM-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default()),
        purchase_date: None,
        condition: Some(EquipmentCondition::Good),
        current_status: None,
        notes: None,
    }
}

async fn active_rentals(repository: &Repository, equipment_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM rentals WHERE equipment_id = $1 AND status = 'ACTIVE'")
        .bind(equipment_id)
        .fetch_one(&repository.pool)
        .await
        .expect("Failed to count rentals")
}

/// At most one active rental, and CHECKED_OUT exactly when one exists
async fn assert_consistent(service: &InventoryService, repository: &Repository, id: i64) {
    let active = active_rentals(repository, id).await;
    let equipment = service.get_equipment(id).await.unwrap();
    assert!(active <= 1, "equipment {} has {} active rentals", id, active);
    assert_eq!(
        equipment.current_status == EquipmentStatus::CheckedOut,
        active == 1,
        "status {} disagrees with {} active rentals",
        equipment.current_status,
        active
    );
}

#[tokio::test]
#[ignore]
async fn test_lifecycle_against_postgres() {
    let (service, repository, user_id) = setup().await;
    let equipment = service.register(unique_camera()).await.unwrap();
    assert_eq!(equipment.current_status, EquipmentStatus::Available);

    let due = Utc::now() + Duration::days(7);
    let rental = service.checkout(equipment.id, user_id, due, None).await.unwrap();
    assert_eq!(rental.status, RentalStatus::Active);
    assert_eq!(active_rentals(&repository, equipment.id).await, 1);

    let closed = service
        .return_equipment(equipment.id, EquipmentCondition::NeedsMaintenance)
        .await
        .unwrap();
    assert_eq!(closed.status, RentalStatus::Damaged);
    assert_eq!(active_rentals(&repository, equipment.id).await, 0);

    let equipment = service.get_equipment(equipment.id).await.unwrap();
    assert_eq!(equipment.current_status, EquipmentStatus::Maintenance);
    assert!(equipment.updated_at >= equipment.created_at);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_serial_against_postgres() {
    let (service, _, _) = setup().await;
    let data = unique_camera();
    service.register(data.clone()).await.unwrap();
    let err = service.register(data).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn test_concurrent_checkouts_against_postgres() {
    let (service, repository, user_id) = setup().await;
    let equipment = service.register(unique_camera()).await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        let id = equipment.id;
        tasks.push(tokio::spawn(async move {
            service
                .checkout(id, user_id, Utc::now() + Duration::days(7), None)
                .await
        }));
    }

    let mut successes = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AppError::InvalidState(_)) | Err(AppError::Conflict(_)) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!(successes, 1, "exactly one checkout should succeed");
    assert_eq!(active_rentals(&repository, equipment.id).await, 1);

    let equipment = service.get_equipment(equipment.id).await.unwrap();
    assert_eq!(equipment.current_status, EquipmentStatus::CheckedOut);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn test_checkout_races_maintenance_against_postgres() {
    let (service, repository, user_id) = setup().await;
    for _ in 0..10 {
        let equipment = service.register(unique_camera()).await.unwrap();
        let id = equipment.id;

        let checkout = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .checkout(id, user_id, Utc::now() + Duration::days(7), None)
                    .await
            })
        };
        let maintenance = {
            let service = service.clone();
            tokio::spawn(async move { service.schedule_maintenance(id).await })
        };
        let checkout = checkout.await.unwrap();
        let maintenance = maintenance.await.unwrap();

        let equipment = service.get_equipment(id).await.unwrap();
        match (&checkout, &maintenance) {
            (Ok(_), Err(AppError::InvalidState(_) | AppError::Conflict(_))) => {
                assert_eq!(equipment.current_status, EquipmentStatus::CheckedOut);
            }
            (Err(AppError::InvalidState(_) | AppError::Conflict(_)), Ok(_)) => {
                assert_eq!(equipment.current_status, EquipmentStatus::Maintenance);
            }
            other => panic!("exactly one side must win: {:?}", other),
        }
        assert_consistent(&service, &repository, id).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore]
async fn test_concurrent_returns_against_postgres() {
    let (service, repository, user_id) = setup().await;
    let equipment = service.register(unique_camera()).await.unwrap();
    service
        .checkout(equipment.id, user_id, Utc::now() + Duration::days(7), None)
        .await
        .unwrap();

    let mut tasks = Vec::new();
    for condition in [EquipmentCondition::Good, EquipmentCondition::NeedsMaintenance] {
        let service = service.clone();
        let id = equipment.id;
        tasks.push(tokio::spawn(async move {
            service.return_equipment(id, condition).await
        }));
    }

    let mut successes = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(closed) => {
                assert_ne!(closed.status, RentalStatus::Active);
                successes += 1;
            }
            Err(AppError::NoActiveRental(_)) | Err(AppError::Conflict(_)) => {}
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!(successes, 1, "exactly one return should succeed");
    assert_consistent(&service, &repository, equipment.id).await;
}
