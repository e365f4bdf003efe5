mod common;

use std::sync::Arc;

use common::fast_settings;
use harvester_core::ImageTally;
use harvester_engine::{
    ControlMatchers, FailureKind, FetchSettings, HarvestSettings, Harvester, MemoryStore,
    RenderBackend, Renderer, RevealOutcome, StaticPageBackend, SurfaceSpec,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tile(id: &str, title: &str, image: &str) -> String {
    format!(
        r#"<li class="product-item"><div class="cp-product" id="{id}">{image}<h3 class="product-title"><a href="/p/{id}">{title}</a></h3><span data-testid="new-price">&#8377;19,990</span></div></li>"#
    )
}

fn page(items: &[String], control: &str) -> String {
    format!(
        r#"<!doctype html><html><head><meta charset="utf-8"><title>TVs</title></head>
<body><ul class="product-list">{}</ul>{control}</body></html>"#,
        items.concat()
    )
}

fn first_page() -> String {
    page(
        &[
            tile(
                "a",
                "Sony Bravia 55",
                r#"<div data-testid="product-img"><img src="/m/a.png"></div>"#,
            ),
            tile(
                "b",
                "LG OLED 48",
                r#"<div data-testid="product-img"><img src="data:image/gif;base64,R0lG" data-src="/m/b.png"></div>"#,
            ),
            tile("c", "Samsung Crystal 43", ""),
        ],
        r#"<button class="view-more" disabled>View More</button><a class="load-more" href="/listing/2">View More</a>"#,
    )
}

fn second_page() -> String {
    page(
        &[
            tile("c", "Samsung Crystal 43", ""),
            tile("d", "Xiaomi X 50", ""),
            tile("e", "Acer I 32", ""),
        ],
        "",
    )
}

async fn listing_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listing"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(first_page(), "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/listing/2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(second_page(), "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;
    server
}

fn settings_for(server: &MockServer) -> HarvestSettings {
    HarvestSettings {
        target_url: format!("{}/listing", server.uri()),
        base_origin: server.uri(),
        ..fast_settings()
    }
}

fn surface(server: &MockServer) -> SurfaceSpec {
    settings_for(server).surface_spec()
}

#[tokio::test]
async fn renderer_materializes_the_whole_listing() {
    let server = listing_server().await;
    let backend = StaticPageBackend::new(FetchSettings::default());
    let mut renderer = backend.launch().await.unwrap();

    renderer.load(&surface(&server)).await.unwrap();

    assert!(renderer.has_element("ul.product-list").await.unwrap());
    assert!(!renderer.has_element("#product-list-back").await.unwrap());
    assert_eq!(renderer.item_count().await.unwrap(), 3);
    renderer.advance_reveal(400).await.unwrap();
    assert_eq!(renderer.item_count().await.unwrap(), 3);
    assert_eq!(
        renderer.image_tally().await.unwrap(),
        ImageTally {
            resolved: 1,
            pending: 1
        }
    );
    let fragments = renderer.item_fragments(1..10).await.unwrap();
    assert_eq!(fragments.len(), 2);
    assert!(fragments[0].contains(r#"id="b""#));
    renderer.close().await;
}

#[tokio::test]
async fn disabled_controls_are_passed_over() {
    let server = listing_server().await;
    let backend = StaticPageBackend::new(FetchSettings::default());
    let mut renderer = backend.launch().await.unwrap();
    renderer.load(&surface(&server)).await.unwrap();

    let control = renderer
        .find_control(&ControlMatchers::default())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(control.label, "View More");
    assert_eq!(control.locator.as_deref(), Some("/listing/2"));
}

#[tokio::test]
async fn activating_the_control_appends_the_linked_page() {
    let server = listing_server().await;
    let backend = StaticPageBackend::new(FetchSettings::default());
    let mut renderer = backend.launch().await.unwrap();
    renderer.load(&surface(&server)).await.unwrap();

    let control = renderer
        .find_control(&ControlMatchers::default())
        .await
        .unwrap()
        .unwrap();
    renderer.activate_control(&control).await.unwrap();

    assert_eq!(renderer.item_count().await.unwrap(), 6);
    assert!(renderer
        .find_control(&ControlMatchers::default())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn harvests_a_static_listing_end_to_end() {
    engine_logging::initialize_for_tests();
    let server = listing_server().await;
    let store = Arc::new(MemoryStore::new());
    let harvester = Harvester::new(
        settings_for(&server),
        Arc::new(StaticPageBackend::new(FetchSettings::default())),
        store,
    )
    .unwrap();

    let seeded = harvester.initial_harvest(12).await.unwrap();
    let ids: Vec<&str> = seeded.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(
        seeded.records[0].detail_url,
        Some(format!("{}/p/a", server.uri()))
    );
    assert_eq!(
        seeded.records[1].image_url,
        Some(format!("{}/m/b.png", server.uri()))
    );

    let grown = harvester.incremental_harvest().await.unwrap();
    assert_eq!(grown.reveal, RevealOutcome::Revealed { range: 3..6 });
    assert_eq!(grown.extracted, 3);
    assert_eq!(grown.added, 2);
    let ids: Vec<&str> = grown.corpus.products.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
}

#[tokio::test]
async fn unreachable_listing_is_surface_not_found() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let harvester = Harvester::new(
        settings_for(&server),
        Arc::new(StaticPageBackend::new(FetchSettings::default())),
        Arc::new(MemoryStore::new()),
    )
    .unwrap();

    let err = harvester.initial_harvest(12).await.unwrap_err();

    assert_eq!(err.kind, FailureKind::SurfaceNotFound);
}
