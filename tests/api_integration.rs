// tests/api_integration.rs
// End-to-end store and service flows against an in-memory SQLite database.

use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;

use maintcontrol::auth::models::{LoginRequest, RegisterRequest};
use maintcontrol::auth::{AuthError, Role};
use maintcontrol::interventions::{NewIntervention, UpdateIntervention};
use maintcontrol::licenses::{remaining_trial_days, LicenseError};
use maintcontrol::scheduler::{rank, Urgency};
use maintcontrol::state::AppState;
use maintcontrol::{db, export};

/// One connection so every query sees the same in-memory database.
async fn test_state() -> AppState {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");
    db::run_migrations(&pool).await.expect("migrations");
    db::seed_if_empty(&pool).await.expect("seed");
    AppState::new(pool)
}

async fn admin(state: &AppState) -> maintcontrol::auth::User {
    state
        .auth
        .get_user_by_username("admin")
        .await
        .expect("query admin")
        .expect("seeded admin")
}

fn new_intervention(title: &str, client: &str, tech: &str, priority: &str) -> NewIntervention {
    NewIntervention {
        title: title.to_string(),
        description: None,
        client_name: Some(client.to_string()),
        technician_name: Some(tech.to_string()),
        status: None,
        priority: Some(priority.to_string()),
        scheduled_date: None,
    }
}

#[tokio::test]
async fn seeded_admin_can_log_in() {
    let state = test_state().await;

    let response = state
        .auth
        .login(LoginRequest {
            username: "admin".to_string(),
            password: "admin".to_string(),
        })
        .await
        .expect("admin login");

    assert_eq!(response.user.username, "admin");
    assert_eq!(response.user.role(), Role::Admin);
    assert!(!response.token.is_empty());
}

#[tokio::test]
async fn repeated_failures_lock_the_account() {
    let state = test_state().await;
    let admin = admin(&state).await;

    state
        .auth
        .register(
            &admin.company_id,
            RegisterRequest {
                username: "marc".to_string(),
                password: "correct-horse".to_string(),
                role: Role::Tech,
            },
        )
        .await
        .expect("register tech");

    for _ in 0..5 {
        let err = state
            .auth
            .login(LoginRequest {
                username: "marc".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    // Account is now locked even for the right password
    let err = state
        .auth
        .login(LoginRequest {
            username: "marc".to_string(),
            password: "correct-horse".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Locked(_)));
}

#[tokio::test]
async fn successful_login_resets_the_failure_counter() {
    let state = test_state().await;
    let admin = admin(&state).await;

    state
        .auth
        .register(
            &admin.company_id,
            RegisterRequest {
                username: "marc".to_string(),
                password: "correct-horse".to_string(),
                role: Role::Tech,
            },
        )
        .await
        .expect("register tech");

    let fail = || LoginRequest {
        username: "marc".to_string(),
        password: "wrong".to_string(),
    };
    let succeed = || LoginRequest {
        username: "marc".to_string(),
        password: "correct-horse".to_string(),
    };

    for _ in 0..4 {
        state.auth.login(fail()).await.unwrap_err();
    }
    state.auth.login(succeed()).await.expect("login clears counter");

    // Four more failures stay under the threshold because of the reset
    for _ in 0..4 {
        let err = state.auth.login(fail()).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
    state.auth.login(succeed()).await.expect("still not locked");

    let user = state
        .auth
        .get_user_by_username("marc")
        .await
        .expect("query")
        .expect("exists");
    assert_eq!(user.failed_logins, 0);
    assert!(user.locked_until.is_none());
}

#[tokio::test]
async fn database_failures_are_not_reported_as_bad_credentials() {
    let state = test_state().await;

    let err = state
        .auth
        .login(LoginRequest {
            username: "ghost".to_string(),
            password: "whatever".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    state.pool.close().await;
    let err = state
        .auth
        .login(LoginRequest {
            username: "admin".to_string(),
            password: "admin".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Other(_)));
}

#[tokio::test]
async fn duplicate_usernames_are_rejected() {
    let state = test_state().await;
    let admin = admin(&state).await;

    let req = || RegisterRequest {
        username: "sam".to_string(),
        password: "pw-123456".to_string(),
        role: Role::Client,
    };
    state.auth.register(&admin.company_id, req()).await.expect("first");
    let err = state.auth.register(&admin.company_id, req()).await.unwrap_err();
    assert!(matches!(err, AuthError::UsernameTaken));
}

#[tokio::test]
async fn intervention_crud_round_trip() {
    let state = test_state().await;
    let admin = admin(&state).await;

    let created = state
        .interventions
        .create(
            &admin.company_id,
            &admin.id,
            new_intervention("Fix boiler", "acme", "marc", "high"),
        )
        .await
        .expect("create");
    assert_eq!(created.status, "open");
    assert_eq!(created.priority, "high");

    let updated = state
        .interventions
        .update(
            &admin.company_id,
            &created.id,
            UpdateIntervention {
                status: Some("done".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("update")
        .expect("exists");
    assert_eq!(updated.status, "done");
    // untouched fields survive the partial update
    assert_eq!(updated.title, "Fix boiler");

    assert!(state
        .interventions
        .delete(&admin.company_id, &created.id)
        .await
        .expect("delete"));
    assert!(state
        .interventions
        .get(&admin.company_id, &created.id)
        .await
        .expect("get")
        .is_none());
}

#[tokio::test]
async fn listing_is_scoped_by_role() {
    let state = test_state().await;
    let admin = admin(&state).await;

    let tech = state
        .auth
        .register(
            &admin.company_id,
            RegisterRequest {
                username: "marc".to_string(),
                password: "pw-123456".to_string(),
                role: Role::Tech,
            },
        )
        .await
        .expect("tech")
        .user;
    let client = state
        .auth
        .register(
            &admin.company_id,
            RegisterRequest {
                username: "acme".to_string(),
                password: "pw-123456".to_string(),
                role: Role::Client,
            },
        )
        .await
        .expect("client")
        .user;

    for (title, client_name, tech_name) in [
        ("Boiler", "acme", "marc"),
        ("Vents", "acme", "julie"),
        ("Pump", "globex", "marc"),
    ] {
        state
            .interventions
            .create(
                &admin.company_id,
                &admin.id,
                new_intervention(title, client_name, tech_name, "medium"),
            )
            .await
            .expect("create");
    }

    assert_eq!(state.interventions.list_scoped(&admin).await.unwrap().len(), 3);
    assert_eq!(state.interventions.list_scoped(&tech).await.unwrap().len(), 2);
    assert_eq!(state.interventions.list_scoped(&client).await.unwrap().len(), 2);
}

#[tokio::test]
async fn license_assignment_activates_the_user() {
    let state = test_state().await;
    let admin = admin(&state).await;

    let user = state
        .auth
        .register(
            &admin.company_id,
            RegisterRequest {
                username: "sam".to_string(),
                password: "pw-123456".to_string(),
                role: Role::Tech,
            },
        )
        .await
        .expect("register")
        .user;
    assert!(!user.is_activated());
    // The trial clock started a moment ago, so 29 or 30 whole days remain.
    let remaining = remaining_trial_days(&user, Utc::now()).expect("trial running");
    assert!((29..=30).contains(&remaining));

    let key = state
        .licenses
        .generate(&admin.company_id, &admin.id)
        .await
        .expect("generate");
    assert!(key.key.starts_with("MC-"));

    state
        .licenses
        .assign(&admin.company_id, &key.key, "sam")
        .await
        .expect("assign");

    let user = state.auth.get_user_by_id(&user.id).await.expect("reload");
    assert!(user.is_activated());
    assert_eq!(user.license_key.as_deref(), Some(key.key.as_str()));
    assert_eq!(remaining_trial_days(&user, Utc::now()), None);

    // A used key cannot be redeemed twice
    let err = state
        .licenses
        .assign(&admin.company_id, &key.key, "sam")
        .await
        .unwrap_err();
    assert!(matches!(err, LicenseError::InvalidKey));
}

#[tokio::test]
async fn unknown_key_is_rejected() {
    let state = test_state().await;
    let admin = admin(&state).await;

    let err = state
        .licenses
        .redeem(&admin.company_id, "MC-DOESNOTEXIST00", &admin.id)
        .await
        .unwrap_err();
    assert!(matches!(err, LicenseError::InvalidKey));
}

#[tokio::test]
async fn suggestions_rank_stored_interventions() {
    let state = test_state().await;
    let admin = admin(&state).await;

    for (title, priority, status) in [
        ("Calm", "low", "done"),
        ("Urgent", "high", "open"),
        ("Middling", "medium", "open"),
    ] {
        let mut req = new_intervention(title, "acme", "marc", priority);
        req.status = Some(status.to_string());
        state
            .interventions
            .create(&admin.company_id, &admin.id, req)
            .await
            .expect("create");
    }

    let interventions = state.interventions.list_scoped(&admin).await.unwrap();
    let ranked = rank(&interventions, Utc::now());

    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0].item.title, "Urgent");
    // freshly created open+high: 30 + 20 = 50
    assert_eq!(ranked[0].score, 50);
    assert_eq!(ranked[0].label, Urgency::High);
    assert_eq!(ranked[2].item.title, "Calm");
    assert_eq!(ranked[2].label, Urgency::Low);
}

#[tokio::test]
async fn attachment_metadata_and_signatures_round_trip() {
    let state = test_state().await;
    let admin = admin(&state).await;

    let intervention = state
        .interventions
        .create(
            &admin.company_id,
            &admin.id,
            new_intervention("Fix boiler", "acme", "marc", "high"),
        )
        .await
        .expect("create");

    let attachment = state
        .attachments
        .create(
            &intervention.id,
            "proof.jpg",
            "/tmp/uploads/abc_proof.jpg",
            "image/jpeg",
            2048,
            &admin.id,
        )
        .await
        .expect("attachment");
    assert_eq!(attachment.file_name, "proof.jpg");

    let listed = state
        .attachments
        .list_for_intervention(&intervention.id)
        .await
        .expect("list");
    assert_eq!(listed.len(), 1);

    let signature = state
        .attachments
        .upsert_signature(&intervention.id, "Mme Dupont", "aGVsbG8=")
        .await
        .expect("sign");
    assert_eq!(signature.signer_name, "Mme Dupont");

    // Re-signing replaces, not duplicates
    let signature = state
        .attachments
        .upsert_signature(&intervention.id, "M. Martin", "aGVsbG8=")
        .await
        .expect("re-sign");
    assert_eq!(signature.signer_name, "M. Martin");
}

#[tokio::test]
async fn exports_cover_company_interventions() {
    let state = test_state().await;
    let admin = admin(&state).await;

    for i in 0..3 {
        state
            .interventions
            .create(
                &admin.company_id,
                &admin.id,
                new_intervention(&format!("Job {i}"), "acme", "marc", "medium"),
            )
            .await
            .expect("create");
    }

    let rows = state.interventions.list_scoped(&admin).await.unwrap();

    let csv_bytes = export::csv::interventions_csv(&rows).expect("csv");
    let text = String::from_utf8(csv_bytes).unwrap();
    assert_eq!(text.lines().count(), 4); // header + 3 rows

    let pdf_bytes = export::pdf::interventions_pdf(&rows).expect("pdf");
    assert!(pdf_bytes.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn customer_directory_round_trip() {
    let state = test_state().await;
    let admin = admin(&state).await;

    let customer = state
        .customers
        .create(
            &admin.company_id,
            "Acme SARL",
            maintcontrol::customers::CustomerPayload {
                name: Some("Acme SARL".to_string()),
                contact_email: Some("contact@acme.test".to_string()),
                phone: None,
                address: None,
            },
        )
        .await
        .expect("create");

    let listed = state.customers.list(&admin.company_id).await.expect("list");
    assert_eq!(listed.len(), 1);

    let updated = state
        .customers
        .update(
            &admin.company_id,
            &customer.id,
            maintcontrol::customers::CustomerPayload {
                name: None,
                contact_email: None,
                phone: Some("0102030405".to_string()),
                address: None,
            },
        )
        .await
        .expect("update")
        .expect("exists");
    assert_eq!(updated.name, "Acme SARL");
    assert_eq!(updated.phone.as_deref(), Some("0102030405"));

    assert!(state
        .customers
        .delete(&admin.company_id, &customer.id)
        .await
        .expect("delete"));
}
