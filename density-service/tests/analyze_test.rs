mod common;

use common::{split_png, TestApp, OTHER_SUBJECT, OTHER_TOKEN, TEST_SUBJECT, TEST_TOKEN};
use density_service::dtos::AnalyzePhotoResponse;
use serde_json::json;

#[tokio::test]
async fn analyze_half_dark_photo_reports_half_density() {
    let app = TestApp::spawn().await;
    app.images
        .put("users/test/p1.png", split_png(200, 200, 0.5))
        .await;

    let response = app
        .analyze(
            Some(TEST_TOKEN),
            json!({ "photoId": "p1", "storagePath": "users/test/p1.png" }),
        )
        .await;

    assert_eq!(response.status(), 200);
    let body: AnalyzePhotoResponse = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body.analysis_id, format!("{}/analysis_p1", TEST_SUBJECT));
    assert_eq!(body.method, "median_threshold_v1");
    assert!(
        (body.density_index - 0.5).abs() < 0.05,
        "density {}",
        body.density_index
    );
    assert_eq!(body.delta_vs_prev, 0.0);
    assert_eq!(body.delta_vs_base, 0.0);
    assert!((body.roi.x - 0.2).abs() < 1e-9);
    assert!((body.roi.w - 0.6).abs() < 1e-9);

    let stored = app.history.analyses(TEST_SUBJECT).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].photo_id, "p1");
}

#[tokio::test]
async fn later_analyses_carry_deltas() {
    let app = TestApp::spawn().await;
    app.images.put("a.png", split_png(200, 200, 0.5)).await;
    app.images.put("b.png", split_png(200, 200, 0.4)).await;
    app.images.put("c.png", split_png(200, 200, 0.6)).await;

    let mut results = Vec::new();
    for (photo, path) in [("a", "a.png"), ("b", "b.png"), ("c", "c.png")] {
        let response = app
            .analyze(
                Some(TEST_TOKEN),
                json!({ "photoId": photo, "storagePath": path, "roiPreset": "crown" }),
            )
            .await;
        assert_eq!(response.status(), 200);
        results.push(response.json::<AnalyzePhotoResponse>().await.unwrap());
    }

    let (first, second, third) = (&results[0], &results[1], &results[2]);
    assert!((second.delta_vs_prev - (second.density_index - first.density_index)).abs() < 1e-9);
    assert!((third.delta_vs_prev - (third.density_index - second.density_index)).abs() < 1e-9);
    assert!((third.delta_vs_base - (third.density_index - first.density_index)).abs() < 1e-9);
    assert!((third.roi.y - 0.15).abs() < 1e-9);
}

#[tokio::test]
async fn malformed_image_returns_400_and_stores_nothing() {
    let app = TestApp::spawn().await;
    app.images.put("bad.png", b"definitely not a png".to_vec()).await;

    let response = app
        .analyze(
            Some(TEST_TOKEN),
            json!({ "photoId": "bad", "storagePath": "bad.png" }),
        )
        .await;

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
    assert!(app.history.analyses(TEST_SUBJECT).await.is_empty());
}

#[tokio::test]
async fn missing_image_returns_404() {
    let app = TestApp::spawn().await;

    let response = app
        .analyze(
            Some(TEST_TOKEN),
            json!({ "photoId": "ghost", "storagePath": "nowhere.png" }),
        )
        .await;

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn empty_storage_path_fails_validation() {
    let app = TestApp::spawn().await;

    let response = app
        .analyze(
            Some(TEST_TOKEN),
            json!({ "photoId": "p1", "storagePath": "" }),
        )
        .await;

    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn requests_without_valid_token_are_rejected() {
    let app = TestApp::spawn().await;
    app.images.put("p.png", split_png(64, 64, 0.5)).await;
    let body = json!({ "photoId": "p", "storagePath": "p.png" });

    assert_eq!(app.analyze(None, body.clone()).await.status(), 401);
    assert_eq!(app.analyze(Some("wrong"), body).await.status(), 401);
    assert!(app.history.analyses(TEST_SUBJECT).await.is_empty());
}

#[tokio::test]
async fn histories_are_kept_per_subject() {
    let app = TestApp::spawn().await;
    app.images.put("a.png", split_png(100, 100, 0.5)).await;
    app.images.put("b.png", split_png(100, 100, 0.3)).await;

    app.analyze(
        Some(TEST_TOKEN),
        json!({ "photoId": "a", "storagePath": "a.png" }),
    )
    .await;
    let response = app
        .analyze(
            Some(OTHER_TOKEN),
            json!({ "photoId": "b", "storagePath": "b.png" }),
        )
        .await;

    let body: AnalyzePhotoResponse = response.json().await.unwrap();
    assert_eq!(body.delta_vs_prev, 0.0);
    assert_eq!(body.delta_vs_base, 0.0);
}

#[tokio::test]
async fn same_photo_id_from_two_subjects_keeps_both_records() {
    let app = TestApp::spawn().await;
    app.images.put("a.png", split_png(100, 100, 0.5)).await;
    app.images.put("b.png", split_png(100, 100, 0.3)).await;

    let first: AnalyzePhotoResponse = app
        .analyze(
            Some(TEST_TOKEN),
            json!({ "photoId": "shared", "storagePath": "a.png" }),
        )
        .await
        .json()
        .await
        .unwrap();
    let second: AnalyzePhotoResponse = app
        .analyze(
            Some(OTHER_TOKEN),
            json!({ "photoId": "shared", "storagePath": "b.png" }),
        )
        .await
        .json()
        .await
        .unwrap();

    assert_ne!(first.analysis_id, second.analysis_id);

    let mine = app.history.analyses(TEST_SUBJECT).await;
    let theirs = app.history.analyses(OTHER_SUBJECT).await;
    assert_eq!(mine.len(), 1);
    assert_eq!(theirs.len(), 1);
    assert_eq!(mine[0].density_index, first.density_index);
    assert_eq!(theirs[0].density_index, second.density_index);
}
