use serde_json::json;

use crate::common::{TestApp, routes};

struct Site {
    org: i32,
    token: String,
    website: i32,
    text_type: i32,
}

async fn site(app: &TestApp) -> Site {
    let (org, owner) = app.owned_organisation("Acme").await;
    let website = app.create_website(org, &owner.token, "Main").await;
    let text_type = app
        .create_block_type(
            org,
            &owner.token,
            "Text",
            json!([{ "label": "Body", "type": "textarea" }]),
        )
        .await;
    Site {
        org,
        token: owner.token,
        website,
        text_type,
    }
}

async fn text_block(app: &TestApp, site: &Site, body: &str) -> i32 {
    let res = app
        .create_block(site.org, &site.token, site.text_type, json!({ "body": body }), &[])
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    res.id()
}

fn rendered_bodies(res: &crate::common::TestResponse) -> Vec<String> {
    res.body["content_blocks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["content"]["body"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn attach_without_order_appends() {
    let app = TestApp::spawn().await;
    let site = site(&app).await;
    let page = app.create_page(site.website, &site.token, "About us").await;
    let a = text_block(&app, &site, "a").await;
    let b = text_block(&app, &site, "b").await;

    let res = app
        .post_with_token(&routes::page_block(site.website, page, a), &json!({}), &site.token)
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["order"], 1);
    assert_eq!(res.body["page_id"], page);
    assert_eq!(res.body["content_block_id"], a);

    let res = app
        .post_with_token(&routes::page_block(site.website, page, b), &json!({}), &site.token)
        .await;
    assert_eq!(res.status, 201);
    assert_eq!(res.body["order"], 2);

    let rendered = app
        .get_with_token(&routes::page(site.website, page), &site.token)
        .await;
    assert_eq!(rendered.status, 200, "{}", rendered.text);
    assert_eq!(rendered.body["slug"], "about-us");
    assert_eq!(rendered_bodies(&rendered), vec!["a", "b"]);
    assert_eq!(rendered.body["content_blocks"][0]["type"], "Text");
    assert_eq!(rendered.body["content_blocks"][0]["id"], a);
}

#[tokio::test]
async fn explicit_order_controls_rendering() {
    let app = TestApp::spawn().await;
    let site = site(&app).await;
    let page = app.create_page(site.website, &site.token, "Home").await;
    let first = text_block(&app, &site, "first").await;
    let second = text_block(&app, &site, "second").await;
    let third = text_block(&app, &site, "third").await;

    for (block, order) in [(third, 30), (first, 10), (second, 20)] {
        let res = app
            .post_with_token(
                &routes::page_block(site.website, page, block),
                &json!({ "order": order }),
                &site.token,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["order"], order);
    }

    let rendered = app
        .get_with_token(&routes::page(site.website, page), &site.token)
        .await;
    assert_eq!(rendered_bodies(&rendered), vec!["first", "second", "third"]);

    let res = app
        .post_with_token(
            &routes::page_block(site.website, page, first),
            &json!({ "order": -1 }),
            &site.token,
        )
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn detached_block_disappears_from_the_page() {
    let app = TestApp::spawn().await;
    let site = site(&app).await;
    let page = app.create_page(site.website, &site.token, "Home").await;
    let block = text_block(&app, &site, "x").await;

    app.post_with_token(&routes::page_block(site.website, page, block), &json!({}), &site.token)
        .await;
    let res = app
        .delete_with_token(&routes::page_block(site.website, page, block), &site.token)
        .await;
    assert_eq!(res.status, 204);

    let res = app
        .delete_with_token(&routes::page_block(site.website, page, block), &site.token)
        .await;
    assert_eq!(res.status, 404);

    let rendered = app
        .get_with_token(&routes::page(site.website, page), &site.token)
        .await;
    assert!(rendered.body["content_blocks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn blocks_of_other_organisations_cannot_be_attached() {
    let app = TestApp::spawn().await;
    let site = site(&app).await;
    let page = app.create_page(site.website, &site.token, "Home").await;

    let (other, other_owner) = app.owned_organisation("Globex").await;
    let foreign_type = app
        .create_block_type(other, &other_owner.token, "Text", json!([]))
        .await;
    let foreign = app
        .create_block(other, &other_owner.token, foreign_type, json!({}), &[])
        .await
        .id();

    let res = app
        .post_with_token(
            &routes::page_block(site.website, page, foreign),
            &json!({}),
            &site.token,
        )
        .await;
    assert_eq!(res.status, 422);
    assert_eq!(res.code(), "CROSS_ORGANISATION_REFERENCE");
}

#[tokio::test]
async fn page_slugs_are_unique_per_website() {
    let app = TestApp::spawn().await;
    let site = site(&app).await;
    app.create_page(site.website, &site.token, "Contact").await;

    let res = app
        .post_with_token(
            &routes::pages(site.website),
            &json!({ "title": "contact" }),
            &site.token,
        )
        .await;
    assert_eq!(res.status, 409);
    assert_eq!(res.code(), "DUPLICATE_SLUG");

    let other_site = app.create_website(site.org, &site.token, "Second").await;
    app.create_page(other_site, &site.token, "Contact").await;
}

#[tokio::test]
async fn deleting_a_page_keeps_its_blocks() {
    let app = TestApp::spawn().await;
    let site = site(&app).await;
    let page = app.create_page(site.website, &site.token, "Home").await;
    let block = text_block(&app, &site, "kept").await;
    app.post_with_token(&routes::page_block(site.website, page, block), &json!({}), &site.token)
        .await;

    let res = app
        .delete_with_token(&routes::page(site.website, page), &site.token)
        .await;
    assert_eq!(res.status, 204);

    let res = app
        .get_with_token(&routes::page(site.website, page), &site.token)
        .await;
    assert_eq!(res.status, 404);
    let res = app
        .get_with_token(&routes::block(site.org, block), &site.token)
        .await;
    assert_eq!(res.status, 200);
}

#[tokio::test]
async fn global_blocks_are_replaced_as_a_whole() {
    let app = TestApp::spawn().await;
    let site = site(&app).await;
    let header = text_block(&app, &site, "header").await;
    let footer = text_block(&app, &site, "footer").await;

    let res = app
        .put_with_token(
            &routes::global_blocks(site.website),
            &json!({ "content_block_ids": [header, footer] }),
            &site.token,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(rendered_bodies(&res), vec!["header", "footer"]);

    let res = app
        .put_with_token(
            &routes::global_blocks(site.website),
            &json!({ "content_block_ids": [footer] }),
            &site.token,
        )
        .await;
    assert_eq!(rendered_bodies(&res), vec!["footer"]);

    let res = app
        .get_with_token(&routes::global_blocks(site.website), &site.token)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(rendered_bodies(&res), vec!["footer"]);
}

#[tokio::test]
async fn failed_global_replace_keeps_the_previous_set() {
    let app = TestApp::spawn().await;
    let site = site(&app).await;
    let header = text_block(&app, &site, "header").await;
    let footer = text_block(&app, &site, "footer").await;

    app.put_with_token(
        &routes::global_blocks(site.website),
        &json!({ "content_block_ids": [header] }),
        &site.token,
    )
    .await;

    let (other, other_owner) = app.owned_organisation("Globex").await;
    let foreign_type = app
        .create_block_type(other, &other_owner.token, "Text", json!([]))
        .await;
    let foreign = app
        .create_block(other, &other_owner.token, foreign_type, json!({}), &[])
        .await
        .id();

    let res = app
        .put_with_token(
            &routes::global_blocks(site.website),
            &json!({ "content_block_ids": [footer, foreign] }),
            &site.token,
        )
        .await;
    assert_eq!(res.status, 422);
    assert_eq!(res.code(), "CROSS_ORGANISATION_REFERENCE");

    let res = app
        .put_with_token(
            &routes::global_blocks(site.website),
            &json!({ "content_block_ids": [footer, footer] }),
            &site.token,
        )
        .await;
    assert_eq!(res.status, 400);

    let res = app
        .get_with_token(&routes::global_blocks(site.website), &site.token)
        .await;
    assert_eq!(rendered_bodies(&res), vec!["header"]);
}

#[tokio::test]
async fn attach_accepts_an_empty_body() {
    let app = TestApp::spawn().await;
    let site = site(&app).await;
    let page = app.create_page(site.website, &site.token, "Home").await;
    let a = text_block(&app, &site, "a").await;
    let b = text_block(&app, &site, "b").await;

    for (block, order) in [(a, 1), (b, 2)] {
        let res = app
            .post_empty_with_token(&routes::page_block(site.website, page, block), &site.token)
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["order"], order);
    }
}

#[tokio::test]
async fn concurrent_pages_with_one_slug_conflict_cleanly() {
    let app = TestApp::spawn().await;
    let site = site(&app).await;
    let path = routes::pages(site.website);

    for i in 0..5 {
        let body = json!({ "title": format!("Landing {i}") });
        let (first, second) = tokio::join!(
            app.post_with_token(&path, &body, &site.token),
            app.post_with_token(&path, &body, &site.token),
        );

        let mut statuses = [first.status, second.status];
        statuses.sort_unstable();
        assert_eq!(statuses, [201, 409], "{} / {}", first.text, second.text);
        let conflict = if first.status == 409 { &first } else { &second };
        assert_eq!(conflict.code(), "DUPLICATE_SLUG");
    }
}
