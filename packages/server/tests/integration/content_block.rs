use reqwest::Method;
use sea_orm::EntityTrait;
use serde_json::json;

use crate::common::{TestApp, Upload, routes};

async fn card_type(app: &TestApp, org: i32, token: &str) -> i32 {
    app.create_block_type(
        org,
        token,
        "Card",
        json!([
            { "label": "Title", "type": "text", "required": true },
            { "label": "Image", "type": "file" }
        ]),
    )
    .await
}

#[tokio::test]
async fn uploaded_file_is_stored_and_served_through_a_signed_url() {
    let app = TestApp::spawn().await;
    let (org, owner) = app.owned_organisation("Acme").await;
    let card = card_type(&app, org, &owner.token).await;

    let res = app
        .create_block(
            org,
            &owner.token,
            card,
            json!({ "title": "Hello" }),
            &[Upload {
                slug: "image",
                filename: "photo.png",
                bytes: b"not really a png",
            }],
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);

    let path = res.body["content"]["image"].as_str().unwrap().to_string();
    assert!(
        path.starts_with(&format!("content-blocks/{card}/")),
        "unexpected path {path}"
    );
    assert!(path.ends_with("photo.png"));
    assert!(app.stored_file_exists(&path));

    let url = res.body["content"]["image_url"].as_str().unwrap();
    let download = app.get_absolute(url).await;
    assert_eq!(download.status(), 200);
    assert_eq!(download.bytes().await.unwrap().as_ref(), b"not really a png");

    // The companion URL is computed on read, never stored.
    let id = res.id();
    let raw = tessera_server::entity::content_block::Entity::find_by_id(id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(raw.content["image"], path.as_str());
    assert!(raw.content.get("image_url").is_none());
}

#[tokio::test]
async fn tampered_signature_is_not_found() {
    let app = TestApp::spawn().await;
    let (org, owner) = app.owned_organisation("Acme").await;
    let card = card_type(&app, org, &owner.token).await;

    let res = app
        .create_block(
            org,
            &owner.token,
            card,
            json!({ "title": "Hello" }),
            &[Upload {
                slug: "image",
                filename: "a.txt",
                bytes: b"secret",
            }],
        )
        .await;
    let url = res.body["content"]["image_url"].as_str().unwrap();

    let tampered = url.replace("signature=", "signature=00");
    assert_eq!(app.get_absolute(&tampered).await.status(), 404);

    let unsigned = url.split('?').next().unwrap();
    assert_eq!(app.get_absolute(unsigned).await.status(), 400);
}

#[tokio::test]
async fn file_fields_follow_the_update_rules() {
    let app = TestApp::spawn().await;
    let (org, owner) = app.owned_organisation("Acme").await;
    let card = card_type(&app, org, &owner.token).await;

    let created = app
        .create_block(
            org,
            &owner.token,
            card,
            json!({ "title": "v1" }),
            &[Upload {
                slug: "image",
                filename: "one.png",
                bytes: b"one",
            }],
        )
        .await;
    let id = created.id();
    let first = created.body["content"]["image"].as_str().unwrap().to_string();

    // Leaving the file out of `content` keeps it; `_url` echoes are ignored.
    let res = app
        .send_block_form(
            Method::PATCH,
            &routes::block(org, id),
            &[(
                "content",
                json!({ "title": "v2", "image_url": "https://elsewhere/x.png" }).to_string(),
            )],
            &[],
            &owner.token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["content"]["title"], "v2");
    assert_eq!(res.body["content"]["image"], first.as_str());
    assert_ne!(res.body["content"]["image_url"], "https://elsewhere/x.png");

    // A path the block never owned is not accepted.
    let res = app
        .send_block_form(
            Method::PATCH,
            &routes::block(org, id),
            &[(
                "content",
                json!({ "title": "v3", "image": "content-blocks/999/other.png" }).to_string(),
            )],
            &[],
            &owner.token,
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["content"]["image"], first.as_str());

    // A new upload replaces the file and removes the old one.
    let res = app
        .send_block_form(
            Method::PATCH,
            &routes::block(org, id),
            &[],
            &[Upload {
                slug: "image",
                filename: "two.png",
                bytes: b"two",
            }],
            &owner.token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    let second = res.body["content"]["image"].as_str().unwrap().to_string();
    assert_ne!(second, first);
    assert!(app.stored_file_exists(&second));
    assert!(!app.stored_file_exists(&first));
    assert_eq!(res.body["content"]["title"], "v3");

    // Null clears the field and deletes the file.
    let res = app
        .send_block_form(
            Method::PATCH,
            &routes::block(org, id),
            &[("content", json!({ "title": "v4", "image": null }).to_string())],
            &[],
            &owner.token,
        )
        .await;
    assert_eq!(res.status, 200);
    assert!(res.body["content"].get("image").is_none());
    assert!(res.body["content"].get("image_url").is_none());
    assert!(!app.stored_file_exists(&second));
}

#[tokio::test]
async fn deleting_a_block_removes_its_files() {
    let app = TestApp::spawn().await;
    let (org, owner) = app.owned_organisation("Acme").await;
    let card = card_type(&app, org, &owner.token).await;

    let created = app
        .create_block(
            org,
            &owner.token,
            card,
            json!({ "title": "x" }),
            &[Upload {
                slug: "image",
                filename: "gone.png",
                bytes: b"bye",
            }],
        )
        .await;
    let path = created.body["content"]["image"].as_str().unwrap().to_string();

    let res = app
        .delete_with_token(&routes::block(org, created.id()), &owner.token)
        .await;
    assert_eq!(res.status, 204);
    assert!(!app.stored_file_exists(&path));

    let res = app
        .get_with_token(&routes::block(org, created.id()), &owner.token)
        .await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn upload_to_a_non_file_field_is_rejected() {
    let app = TestApp::spawn().await;
    let (org, owner) = app.owned_organisation("Acme").await;
    let card = card_type(&app, org, &owner.token).await;

    let res = app
        .create_block(
            org,
            &owner.token,
            card,
            json!({ "title": "x" }),
            &[Upload {
                slug: "title",
                filename: "a.txt",
                bytes: b"a",
            }],
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn unknown_block_type_is_unresolvable() {
    let app = TestApp::spawn().await;
    let (org, owner) = app.owned_organisation("Acme").await;

    let res = app
        .create_block(org, &owner.token, 987_654, json!({}), &[])
        .await;
    assert_eq!(res.status, 422);
    assert_eq!(res.code(), "UNRESOLVABLE_TYPE");
}

#[tokio::test]
async fn validate_reports_required_fields() {
    let app = TestApp::spawn().await;
    let (org, owner) = app.owned_organisation("Acme").await;
    let card = card_type(&app, org, &owner.token).await;

    let incomplete = app
        .create_block(org, &owner.token, card, json!({}), &[])
        .await;
    assert_eq!(incomplete.status, 201, "{}", incomplete.text);
    let res = app
        .get_with_token(&routes::block_validate(org, incomplete.id()), &owner.token)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["valid"], false);

    let complete = app
        .create_block(org, &owner.token, card, json!({ "title": "Done" }), &[])
        .await;
    let res = app
        .get_with_token(&routes::block_validate(org, complete.id()), &owner.token)
        .await;
    assert_eq!(res.body["valid"], true);
}

#[tokio::test]
async fn blocks_are_scoped_to_websites() {
    let app = TestApp::spawn().await;
    let (org, owner) = app.owned_organisation("Acme").await;
    let card = card_type(&app, org, &owner.token).await;
    let site = app.create_website(org, &owner.token, "Main").await;

    let shared = app
        .create_block(org, &owner.token, card, json!({ "title": "shared" }), &[])
        .await
        .id();
    let specific = app
        .send_block_form(
            Method::POST,
            &routes::blocks(org),
            &[
                ("content_block_type_id", card.to_string()),
                ("website_id", site.to_string()),
                ("description", "Footer only".to_string()),
                ("content", json!({ "title": "site" }).to_string()),
            ],
            &[],
            &owner.token,
        )
        .await;
    assert_eq!(specific.status, 201, "{}", specific.text);
    assert_eq!(specific.body["website_id"], site);
    assert_eq!(specific.body["description"], "Footer only");
    let specific = specific.id();

    let ids = |res: &crate::common::TestResponse| -> Vec<i64> {
        res.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["id"].as_i64().unwrap())
            .collect()
    };

    let all = app.get_with_token(&routes::blocks(org), &owner.token).await;
    assert_eq!(ids(&all), vec![shared as i64, specific as i64]);

    let org_wide = app
        .get_with_token(
            &format!("{}?scope=organisation_wide", routes::blocks(org)),
            &owner.token,
        )
        .await;
    assert_eq!(ids(&org_wide), vec![shared as i64]);

    let for_site = app
        .get_with_token(
            &format!("{}?website_id={site}", routes::blocks(org)),
            &owner.token,
        )
        .await;
    assert_eq!(ids(&for_site), vec![specific as i64]);
}

#[tokio::test]
async fn website_of_another_organisation_is_rejected() {
    let app = TestApp::spawn().await;
    let (org, owner) = app.owned_organisation("Acme").await;
    let (other, other_owner) = app.owned_organisation("Globex").await;
    let card = card_type(&app, org, &owner.token).await;
    let foreign_site = app.create_website(other, &other_owner.token, "Theirs").await;

    let res = app
        .send_block_form(
            Method::POST,
            &routes::blocks(org),
            &[
                ("content_block_type_id", card.to_string()),
                ("website_id", foreign_site.to_string()),
                ("content", json!({ "title": "x" }).to_string()),
            ],
            &[],
            &owner.token,
        )
        .await;
    assert_eq!(res.status, 422);
    assert_eq!(res.code(), "CROSS_ORGANISATION_REFERENCE");
}

#[tokio::test]
async fn content_must_be_a_json_object() {
    let app = TestApp::spawn().await;
    let (org, owner) = app.owned_organisation("Acme").await;
    let card = card_type(&app, org, &owner.token).await;

    let res = app
        .send_block_form(
            Method::POST,
            &routes::blocks(org),
            &[
                ("content_block_type_id", card.to_string()),
                ("content", "[1, 2]".to_string()),
            ],
            &[],
            &owner.token,
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn concurrent_edits_keep_the_uploaded_file() {
    let app = TestApp::spawn().await;
    let (org, owner) = app.owned_organisation("Acme").await;
    let card = card_type(&app, org, &owner.token).await;

    let created = app
        .create_block(
            org,
            &owner.token,
            card,
            json!({ "title": "v0" }),
            &[Upload {
                slug: "image",
                filename: "start.png",
                bytes: b"start",
            }],
        )
        .await;
    assert_eq!(created.status, 201, "{}", created.text);
    let id = created.id();
    let path = routes::block(org, id);

    for round in 0..5 {
        let title = json!({ "title": format!("v{}", round + 1) }).to_string();
        let (upload, edit) = tokio::join!(
            app.send_block_form(
                Method::PATCH,
                &path,
                &[],
                &[Upload {
                    slug: "image",
                    filename: "next.png",
                    bytes: b"next",
                }],
                &owner.token,
            ),
            app.send_block_form(
                Method::PATCH,
                &path,
                &[("content", title)],
                &[],
                &owner.token,
            ),
        );
        assert_eq!(upload.status, 200, "{}", upload.text);
        assert_eq!(edit.status, 200, "{}", edit.text);

        let current = app.get_with_token(&path, &owner.token).await;
        let image = current.body["content"]["image"].as_str().unwrap();
        assert!(app.stored_file_exists(image), "round {round}: {image} is gone");
        assert_eq!(
            app.stored_file_count(&format!("content-blocks/{card}")),
            1,
            "round {round}: stale files left behind"
        );
    }
}

#[tokio::test]
async fn text_in_a_field_turned_file_is_left_alone() {
    let app = TestApp::spawn().await;

    let (other, other_owner) = app.owned_organisation("Globex").await;
    let other_card = card_type(&app, other, &other_owner.token).await;
    let victim = app
        .create_block(
            other,
            &other_owner.token,
            other_card,
            json!({ "title": "theirs" }),
            &[Upload {
                slug: "image",
                filename: "theirs.png",
                bytes: b"theirs",
            }],
        )
        .await;
    let victim_path = victim.body["content"]["image"].as_str().unwrap().to_string();

    let (org, owner) = app.owned_organisation("Acme").await;
    let note = app
        .create_block_type(
            org,
            &owner.token,
            "Note",
            json!([{ "label": "Image", "type": "text" }]),
        )
        .await;
    let block = app
        .create_block(org, &owner.token, note, json!({ "image": victim_path }), &[])
        .await;
    assert_eq!(block.status, 201, "{}", block.text);
    let id = block.id();

    let res = app
        .patch_with_token(
            &routes::block_type(org, note),
            &json!({ "fields": [{ "label": "Image", "type": "file" }] }),
            &owner.token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let res = app.get_with_token(&routes::block(org, id), &owner.token).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["content"]["image"], victim_path.as_str());
    assert!(res.body["content"].get("image_url").is_none());

    let res = app
        .delete_with_token(&routes::block(org, id), &owner.token)
        .await;
    assert_eq!(res.status, 204);
    assert!(app.stored_file_exists(&victim_path));
}
