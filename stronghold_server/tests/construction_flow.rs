mod test_utils;

use chrono::Duration;
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use stronghold_app::config::Config;
use test_utils::tests::setup_web_app;

#[tokio::test]
async fn test_full_upgrade_flow() {
    let app = setup_web_app(Config::default()).await;
    let player_id = Uuid::new_v4();

    let res = app.register_village(player_id, 1).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app.get(player_id, "/villages/1/resources").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let resources: Value = res.json().await.unwrap();
    assert_eq!(resources["resources"], json!([750, 750, 750, 750]));
    assert_eq!(resources["capacity"], json!([1200, 1200, 1200, 1200]));

    let res = app
        .get(player_id, "/villages/1/buildings/town_hall")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let info: Value = res.json().await.unwrap();
    assert_eq!(info["current_level"], 1);
    assert_eq!(info["next_level"], 2);
    assert_eq!(info["can_upgrade"], true);

    let res = app
        .post(player_id, "/villages/1/buildings/town_hall/upgrade")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let started: Value = res.json().await.unwrap();
    assert_eq!(started["building"], "town_hall");
    assert_eq!(started["new_level"], 2);
    assert_eq!(started["costs"], info["cost"]);

    // a second start on the same building conflicts and charges nothing
    let res = app
        .post(player_id, "/villages/1/buildings/town_hall/upgrade")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // town hall level 2 takes 375s
    let res = app
        .get(player_id, "/villages/1/buildings/town_hall/time-remaining")
        .send()
        .await
        .unwrap();
    let remaining: Value = res.json().await.unwrap();
    assert_eq!(remaining["is_upgrading"], true);
    assert_eq!(remaining["time_remaining"], 375);
    assert_eq!(remaining["formatted_time"], "06:15");
    assert_eq!(remaining["can_complete"], false);

    let res = app
        .post(player_id, "/villages/1/buildings/town_hall/complete")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    app.clock.advance(Duration::seconds(375));

    let res = app
        .post(player_id, "/villages/1/buildings/town_hall/complete")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let completed: Value = res.json().await.unwrap();
    assert_eq!(completed["previous_level"], 1);
    assert_eq!(completed["new_level"], 2);

    let res = app
        .post(player_id, "/villages/1/buildings/town_hall/complete")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cancel_refunds_by_remaining_time() {
    let app = setup_web_app(Config::default()).await;
    let player_id = Uuid::new_v4();
    app.register_village(player_id, 2).await;

    // barracks level 1 costs 210/140/260/120 and takes 600s
    let res = app
        .post(player_id, "/villages/2/buildings/barracks/upgrade")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    app.clock.advance(Duration::seconds(150));

    let res = app
        .post(player_id, "/villages/2/buildings/barracks/cancel")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cancel: Value = res.json().await.unwrap();
    assert_eq!(cancel["building_type"], "barracks");
    assert_eq!(cancel["refund_percentage"], 37.5);
    assert_eq!(cancel["refund_amount"], json!([78, 52, 97, 45]));
    assert_eq!(cancel["original_cost"], json!([210, 140, 260, 120]));
    assert_eq!(cancel["time_remaining"], 450);

    let res = app
        .post(player_id, "/villages/2/buildings/barracks/cancel")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_queue_is_processed_on_demand() {
    let app = setup_web_app(Config::default()).await;
    let player_id = Uuid::new_v4();
    app.register_village(player_id, 3).await;

    for building in ["farm", "quarry"] {
        let res = app
            .post(player_id, &format!("/villages/3/buildings/{building}/upgrade"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    app.clock.advance(Duration::minutes(10));

    let res = app
        .post(player_id, "/villages/3/queue/process")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let report: Value = res.json().await.unwrap();
    assert_eq!(report["completed"].as_array().unwrap().len(), 2);

    let res = app.get(player_id, "/villages/3/queue").send().await.unwrap();
    let status: Value = res.json().await.unwrap();
    let farm = status
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["building"] == "farm")
        .unwrap()
        .clone();
    assert_eq!(farm["level"], 2);
    assert_eq!(farm["is_upgrading"], false);
}

#[tokio::test]
async fn test_request_errors() {
    let app = setup_web_app(Config::default()).await;
    let owner = Uuid::new_v4();
    app.register_village(owner, 4).await;

    let res = app
        .client
        .get(format!("{}/villages/4/resources", app.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .get(Uuid::new_v4(), "/villages/4/resources")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .get(owner, "/villages/999/resources")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .post(owner, "/villages/4/buildings/castle/upgrade")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("castle"));

    let res = app.register_village(owner, 4).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_queue_limit() {
    let config = Config {
        max_concurrent_upgrades: Some(1),
        ..Default::default()
    };
    let app = setup_web_app(config).await;
    let player_id = Uuid::new_v4();
    app.register_village(player_id, 5).await;

    let res = app
        .post(player_id, "/villages/5/buildings/woodcutter/upgrade")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .post(player_id, "/villages/5/buildings/farm/upgrade")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}
