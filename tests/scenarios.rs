//! End-to-end flows over an on-disk store.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use simple_site::builder;
use simple_site::collection::{self, PostDraft, SectionDraft};
use simple_site::config::SiteConfig;
use simple_site::controller::Controller;
use simple_site::editor::{self, ContentEditor};
use simple_site::render;
use simple_site::share;
use simple_site::storage::{FileStore, KeyValueStore};
use simple_site::store::StateStore;
use simple_site::types::{AppState, DOCUMENT_KEY, STATE_KEY, Theme};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tempfile::TempDir;

fn open(dir: &Path) -> Controller<FileStore> {
    let backend = FileStore::open(dir.join(".simple-site")).unwrap();
    Controller::new(StateStore::open(backend, STATE_KEY), &SiteConfig::default())
}

fn post(title: &str, text: &str) -> PostDraft {
    PostDraft {
        title: title.into(),
        text: text.into(),
        ..PostDraft::default()
    }
}

#[test]
fn sections_filter_posts_across_restarts() {
    let tmp = TempDir::new().unwrap();
    let mut site = open(tmp.path());

    site.submit_post(post("Hello", "first post")).unwrap();
    let about = site
        .add_section(SectionDraft {
            icon: "👤".into(),
            title: "About".into(),
            description: "Who I am".into(),
        })
        .unwrap();
    assert!(site.select_section(&about));
    site.submit_post(post("Bio", "about me")).unwrap();
    drop(site);

    let site = open(tmp.path());
    let state = site.state();
    assert_eq!(collection::active_section(state).unwrap().title, "About");
    let titles: Vec<_> = collection::visible_items(state)
        .iter()
        .map(|i| i.title.as_str())
        .collect();
    assert_eq!(titles, ["Bio"]);
    assert_eq!(collection::item_count(state, "home"), 2);
    assert_eq!(state.menu_items.iter().filter(|m| m.active).count(), 1);

    let html = render::render_site(state, &SiteConfig::default()).into_string();
    assert!(html.contains("Bio"));
    assert!(!html.contains("first post"));
}

#[test]
fn switching_sections_round_trips_posts() {
    let tmp = TempDir::new().unwrap();
    let mut site = open(tmp.path());
    let welcome = site.state().content_items[0].id.clone();
    assert!(site.request_delete_post(&welcome));
    assert!(site.confirm());

    let id = site.submit_post(post("Hi", "Hello world")).unwrap();
    let home = collection::active_section(site.state()).unwrap().id.clone();
    let visible = collection::visible_items(site.state());
    assert_eq!(visible.len(), 1);
    let original = visible[0].clone();
    assert_eq!(original.id, id);
    assert_eq!(original.title, "Hi");
    assert_eq!(original.text, "Hello world");
    assert!(original.images.is_empty());
    assert!(original.videos.is_empty());
    assert_eq!(original.menu_id, home);

    let about = site
        .add_section(SectionDraft {
            title: "About".into(),
            ..SectionDraft::default()
        })
        .unwrap();
    assert!(site.select_section(&about));
    assert!(collection::visible_items(site.state()).is_empty());

    assert!(site.select_section(&home));
    assert_eq!(collection::visible_items(site.state()), [&original]);
}

#[test]
fn shared_link_opens_read_only() {
    let author_dir = TempDir::new().unwrap();
    let mut author = open(author_dir.path());
    author.set_edit_mode(true);
    author.set_theme(Theme::Purple);
    author.edit_site_title("Portfolio", Instant::now());
    author.flush();
    let url = author.share_link();
    assert!(url.starts_with("http://localhost:8000/index.html?data="));

    let viewer_dir = TempDir::new().unwrap();
    let mut viewer = open(viewer_dir.path());
    assert!(viewer.open_shared(&url));
    assert_eq!(viewer.state().site_title, "Portfolio");
    assert_eq!(viewer.state().current_theme, Theme::Purple);
    assert!(!viewer.state().is_edit_mode);
    assert!(viewer.state().is_preview_mode);

    // The viewer's own store is untouched.
    drop(viewer);
    let reopened = open(viewer_dir.path());
    assert_eq!(reopened.state().site_title, "My Website");
}

#[test]
fn tampered_token_cannot_enable_editing() {
    let mut state = AppState::default();
    state.is_edit_mode = true;
    let json = serde_json::to_string(&state).unwrap();
    let token = BASE64.encode(json);

    let partial = share::decode(&token).unwrap();
    assert_eq!(partial.is_edit_mode, Some(false));
    assert_eq!(partial.is_preview_mode, Some(true));
}

#[test]
fn corrupt_store_falls_back_to_default() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join(".simple-site");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{STATE_KEY}.json")), "{ not json").unwrap();

    let site = open(tmp.path());
    assert_eq!(site.state().site_title, "My Website");
    assert_eq!(site.state().menu_items.len(), 1);
}

#[test]
fn invalid_import_keeps_saved_state() {
    let tmp = TempDir::new().unwrap();
    let mut site = open(tmp.path());
    site.edit_site_title("Mine", Instant::now());
    site.flush();

    let bad = tmp.path().join("bad.json");
    fs::write(&bad, "not json at all").unwrap();
    assert!(!site.import_file(&bad));
    assert_eq!(site.state().site_title, "Mine");

    let backend = FileStore::open(tmp.path().join(".simple-site")).unwrap();
    let raw = backend.get(STATE_KEY).unwrap().unwrap();
    assert!(raw.contains("\"siteTitle\":\"Mine\""));
}

#[test]
fn legacy_single_image_posts_still_render() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join(".simple-site");
    fs::create_dir_all(&dir).unwrap();
    let legacy = r#"{
        "siteTitle": "Old site",
        "menuItems": [{"id":"m1","icon":"","title":"Home","description":"","active":true}],
        "contentItems": [{"id":"p1","title":"Old","text":"","image":"https://cdn.example/old.jpg",
                          "timestamp":"2023-01-02T03:04:05.000Z","menuId":"m1"}]
    }"#;
    fs::write(dir.join(format!("{STATE_KEY}.json")), legacy).unwrap();

    let site = open(tmp.path());
    let html = render::render_site(site.state(), &SiteConfig::default()).into_string();
    assert!(html.contains(r#"src="https://cdn.example/old.jpg""#));
}

#[test]
fn editor_document_survives_reopen_and_renders() {
    let tmp = TempDir::new().unwrap();
    let store_dir = tmp.path().join(".simple-site");
    let picture = tmp.path().join("cat.gif");
    fs::write(&picture, b"GIF89a").unwrap();
    let config = SiteConfig::default();

    let mut ed = ContentEditor::open(
        FileStore::open(&store_dir).unwrap(),
        DOCUMENT_KEY,
        config.media.clone(),
        config.autosave.delay(),
    );
    ed.set_title("Cats", Instant::now());
    ed.attach_media(&picture, Instant::now()).unwrap();
    ed.submit().unwrap();
    drop(ed);

    let backend = FileStore::open(&store_dir).unwrap();
    let doc = editor::read_document(&backend, DOCUMENT_KEY).unwrap().unwrap();
    assert_eq!(doc.title, "Cats");
    let html = render::render_document(Some(&doc), chrono::Utc::now(), &config).into_string();
    assert!(html.contains("data:image/gif;base64,"));
    assert!(html.contains("Created Just now"));
}

#[test]
fn builder_writes_standalone_page() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("content.json");
    fs::write(
        &input,
        r#"{"blocks":[
            {"title":"One","media":"https://cdn.example/1.jpg","text":"first *block*"},
            {"title":"Two","text":"second"}
        ]}"#,
    )
    .unwrap();
    let output = tmp.path().join("index.html");

    let written = builder::build(&input, &output, "News", Theme::Orange, &SiteConfig::default())
        .unwrap();
    assert_eq!(written, 2);
    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("<em>block</em>"));
    assert!(html.contains("theme-orange"));
    assert_eq!(html.matches(r#"class="post-block""#).count(), 2);
}

#[test]
fn builder_empty_document_shows_placeholder() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("content.json");
    fs::write(&input, r#"{"blocks":[]}"#).unwrap();
    let output = tmp.path().join("index.html");

    builder::build(&input, &output, "News", Theme::Blue, &SiteConfig::default()).unwrap();
    assert!(
        fs::read_to_string(&output)
            .unwrap()
            .contains(builder::EMPTY_MESSAGE)
    );
}
