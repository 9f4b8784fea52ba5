use std::sync::Arc;

use chrono::NaiveDate;

use clubside::model::DocumentId;
use clubside::repository::{Attachments, NewMatchResult};
use clubside::service::{LogNotifier, Services};
use clubside::store::{FileUpload, StrapiClient};

#[tokio::main]
async fn main() {
    let base_url =
        std::env::var("CLUBSIDE_URL").unwrap_or_else(|_| "http://localhost:1337".to_string());
    let client = StrapiClient::new(&base_url);

    // Sign in, then bind all further calls to that member's token.
    let anonymous = Services::new(Arc::new(client.clone()), Arc::new(LogNotifier));
    let session = anonymous.auth.login("petra", "secret").await.unwrap();
    println!("signed in as {}", session.user.username);

    let services = Services::new(
        Arc::new(client.as_user(session.token.as_str())),
        Arc::new(LogNotifier),
    );

    let photo = FileUpload {
        file_name: "team.jpg".into(),
        content_type: "image/jpeg".into(),
        bytes: std::fs::read("team.jpg").unwrap_or_default(),
    };

    let saved = services
        .match_results
        .create(
            &NewMatchResult {
                home_team: "SC Blau-Weiß".into(),
                away_team: "FC Rot".into(),
                home_score: 3,
                away_score: 1,
                goalscorers: Some("Meyer (2), Kranz".into()),
                report: None,
                category_ids: vec![DocumentId::from("cat-first-team")],
                match_date: NaiveDate::from_ymd_opt(2025, 9, 14).unwrap(),
                image_url: None,
                author: Some(session.user.id.clone()),
            },
            Attachments {
                photos: vec![photo],
                files: vec![],
            },
        )
        .await
        .unwrap();

    println!(
        "saved match result {} with {} photo(s)",
        saved.value.id,
        saved.value.photos.len()
    );
    for warning in &saved.warnings {
        println!("warning: {warning}");
    }
}
