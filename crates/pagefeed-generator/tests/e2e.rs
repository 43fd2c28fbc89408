//! End-to-end tests for pagefeed.
//!
//! These tests render complete feeds into a temporary output directory and
//! read them back with feed parsers.

use std::{fs, path::Path, sync::Arc};

use pagefeed_core::{Config, FeedConfiguration};
use pagefeed_generator::{
    Context, DirectoryWriter, FileTemplateLoader, Page, Renderable, RenderableExt, Renderer,
    TemplateRegistry, manipulation::copy_value, render_atom, render_feeds, render_rss,
    render_rss_with,
};

fn blog(url: &str) -> FeedConfiguration {
    FeedConfiguration {
        url: url.to_string(),
        title: "Blog".to_string(),
        description: "Posts".to_string(),
        author_name: "A. Writer".to_string(),
    }
}

fn renderer() -> Renderer {
    Renderer::new(TemplateRegistry::new(), "https://example.com/")
}

fn post(title: &str, url: &str, timestamp: Option<&str>) -> Arc<dyn Renderable> {
    let mut ctx = Context::new()
        .with("title", title)
        .with("description", format!("{title} <em>post</em>"))
        .with("url", url);
    if let Some(timestamp) = timestamp {
        ctx.insert("timestamp", timestamp);
    }
    ctx.shared()
}

fn read_rss(path: &Path) -> rss::Channel {
    let xml = fs::read(path).expect("feed should be written");
    rss::Channel::read_from(&xml[..]).expect("feed should be valid RSS")
}

#[test]
fn test_rss_feed() {
    let out = tempfile::tempdir().unwrap();
    let writer = DirectoryWriter::new(out.path());
    let items = vec![
        post("Second", "posts/second.html", Some("2020-02-02")),
        post("First", "posts/first.html", Some("2020-01-01")),
    ];

    render_rss(&blog("rss.xml"), items, &renderer(), &writer).unwrap();

    let channel = read_rss(&out.path().join("rss.xml"));
    assert_eq!(channel.title(), "Blog");
    assert_eq!(channel.description(), "Posts");
    assert_eq!(channel.link(), "https://example.com/");
    assert_eq!(channel.managing_editor(), Some("A. Writer"));
    assert_eq!(channel.last_build_date(), Some("Sun, 02 Feb 2020 00:00:00 UT"));

    let titles: Vec<_> = channel.items().iter().filter_map(|i| i.title()).collect();
    assert_eq!(titles, vec!["Second", "First"]);

    let first = &channel.items()[1];
    assert_eq!(first.link(), Some("https://example.com/posts/first.html"));
    assert_eq!(first.description(), Some("First <em>post</em>"));
    assert_eq!(first.pub_date(), Some("Wed, 01 Jan 2020 00:00:00 UT"));
}

#[test]
fn test_rooted_urls_and_markup_in_text() {
    let out = tempfile::tempdir().unwrap();
    let writer = DirectoryWriter::new(out.path());
    let config = FeedConfiguration {
        title: "Rust & Go".to_string(),
        author_name: "Writer <w@example.com>".to_string(),
        ..blog("/rss.xml")
    };
    let items = vec![
        post("Second & last", "/2", Some("2020-02-02")),
        post("First", "/1", Some("2020-01-01")),
    ];

    render_rss(&config, items, &renderer(), &writer).unwrap();

    let channel = read_rss(&out.path().join("rss.xml"));
    assert_eq!(channel.title(), "Rust & Go");
    assert_eq!(channel.managing_editor(), Some("Writer <w@example.com>"));
    assert_eq!(channel.items()[0].title(), Some("Second & last"));
    assert_eq!(channel.items()[0].link(), Some("https://example.com/2"));
    assert_eq!(channel.items()[1].link(), Some("https://example.com/1"));
}

#[test]
fn test_atom_feed_with_markup_in_text() {
    let out = tempfile::tempdir().unwrap();
    let writer = DirectoryWriter::new(out.path());
    let config = FeedConfiguration {
        title: "Rust & Go".to_string(),
        ..blog("atom.xml")
    };

    render_atom(
        &config,
        vec![post("Tom & Jerry", "/tj", Some("2020-02-02"))],
        &renderer(),
        &writer,
    )
    .unwrap();

    let xml = fs::read(out.path().join("atom.xml")).unwrap();
    let feed = atom_syndication::Feed::read_from(&xml[..]).expect("feed should be valid Atom");
    assert_eq!(feed.title().value, "Rust & Go");
    assert_eq!(feed.entries()[0].title().value, "Tom & Jerry");
    assert_eq!(feed.entries()[0].id(), "https://example.com/tj");
}

#[test]
fn test_atom_feed() {
    let out = tempfile::tempdir().unwrap();
    let writer = DirectoryWriter::new(out.path());
    let items = vec![
        post("Second", "posts/second.html", Some("2020-02-02T08:15:00+01:00")),
        post("First", "posts/first.html", Some("2020-01-01")),
    ];

    render_atom(&blog("feeds/atom.xml"), items, &renderer(), &writer).unwrap();

    let xml = fs::read(out.path().join("feeds/atom.xml")).unwrap();
    let feed = atom_syndication::Feed::read_from(&xml[..]).expect("feed should be valid Atom");
    assert_eq!(feed.title().value, "Blog");
    assert_eq!(feed.id(), "https://example.com/feeds/atom.xml");
    assert_eq!(feed.authors()[0].name(), "A. Writer");
    assert_eq!(feed.updated().to_rfc3339(), "2020-02-02T07:15:00+00:00");

    let entries = feed.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].title().value, "Second");
    assert_eq!(entries[1].id(), "https://example.com/posts/first.html");
    assert_eq!(entries[1].updated().to_rfc3339(), "2020-01-01T00:00:00+00:00");
}

#[test]
fn test_items_without_timestamp() {
    let out = tempfile::tempdir().unwrap();
    let writer = DirectoryWriter::new(out.path());
    let items = vec![post("Undated", "undated.html", None)];

    render_rss(&blog("rss.xml"), items, &renderer(), &writer).unwrap();

    let channel = read_rss(&out.path().join("rss.xml"));
    assert_eq!(channel.last_build_date(), Some("foo"));
    assert_eq!(channel.items()[0].pub_date(), Some("No date found."));
}

#[test]
fn test_empty_feed() {
    let out = tempfile::tempdir().unwrap();
    let writer = DirectoryWriter::new(out.path());

    render_rss(&blog("rss.xml"), Vec::new(), &renderer(), &writer).unwrap();

    let channel = read_rss(&out.path().join("rss.xml"));
    assert!(channel.items().is_empty());
    assert_eq!(channel.last_build_date(), Some("foo"));
}

#[test]
fn test_feed_metadata_wins_over_item_fields() {
    let out = tempfile::tempdir().unwrap();
    let writer = DirectoryWriter::new(out.path());
    let items = vec![post("Only", "only.html", Some("2020-01-01"))];

    render_rss(&blog("rss.xml"), items, &renderer(), &writer).unwrap();

    let channel = read_rss(&out.path().join("rss.xml"));
    assert_eq!(channel.title(), "Blog");
    assert_eq!(channel.items()[0].title(), Some("Only"));
}

#[test]
fn test_item_manipulation_is_applied() {
    let out = tempfile::tempdir().unwrap();
    let writer = DirectoryWriter::new(out.path());
    let item = Context::new()
        .with("title", "Dated")
        .with("description", "d")
        .with("url", "dated.html")
        .with("published", "2021-03-04")
        .shared();

    render_rss_with(
        copy_value("published", "timestamp"),
        &blog("rss.xml"),
        vec![item],
        &renderer(),
        &writer,
    )
    .unwrap();

    let channel = read_rss(&out.path().join("rss.xml"));
    assert_eq!(channel.last_build_date(), Some("Thu, 04 Mar 2021 00:00:00 UT"));
    assert_eq!(
        channel.items()[0].pub_date(),
        Some("Thu, 04 Mar 2021 00:00:00 UT")
    );
}

#[test]
fn test_missing_template_writes_nothing() {
    let out = tempfile::tempdir().unwrap();
    let writer = DirectoryWriter::new(out.path());
    let templates = TemplateRegistry::empty().with("rss-item.xml", "<item/>");
    let renderer = Renderer::new(templates, "https://example.com");

    let result = render_rss(
        &blog("rss.xml"),
        vec![post("A", "a.html", None)],
        &renderer,
        &writer,
    );
    assert!(result.is_err());
    assert!(!out.path().join("rss.xml").exists());
}

#[test]
fn test_feed_from_pages() {
    let content = tempfile::tempdir().unwrap();
    fs::create_dir_all(content.path().join("posts")).unwrap();
    fs::write(
        content.path().join("posts/hello.md"),
        "---\ntitle: Hello\ndescription: Greetings\ntimestamp: 2020-03-01\n---\n\n# Hello\n",
    )
    .unwrap();
    fs::write(
        content.path().join("posts/older.md"),
        "+++\ntitle = \"Older\"\ndescription = \"Earlier\"\ntimestamp = \"2019-12-24\"\n+++\nOld\n",
    )
    .unwrap();

    let items = vec![
        Page::new(content.path(), "posts/hello.md").shared(),
        Page::new(content.path(), "posts/older.md").shared(),
    ];
    let out = tempfile::tempdir().unwrap();
    let writer = DirectoryWriter::new(out.path());

    render_rss(&blog("rss.xml"), items, &renderer(), &writer).unwrap();

    let channel = read_rss(&out.path().join("rss.xml"));
    assert_eq!(channel.last_build_date(), Some("Sun, 01 Mar 2020 00:00:00 UT"));
    let links: Vec<_> = channel.items().iter().filter_map(|i| i.link()).collect();
    assert_eq!(
        links,
        vec![
            "https://example.com/posts/hello.html",
            "https://example.com/posts/older.html"
        ]
    );
}

#[test]
fn test_feeds_from_config() {
    let site = tempfile::tempdir().unwrap();
    let templates = site.path().join("templates");
    let output = site.path().join("public");
    fs::create_dir_all(&templates).unwrap();
    fs::write(
        templates.join("rss-item.xml"),
        "<item><title>[{{ title }}]</title><link>{{ absolute }}/{{ url }}</link></item>",
    )
    .unwrap();

    let config_path = site.path().join("pagefeed.toml");
    fs::write(
        &config_path,
        format!(
            r#"
[site]
title = "Site"
base_url = "https://example.com"

[build]
output_dir = "{}"
templates_dir = "{}"

[[feeds]]
url = "rss.xml"
title = "Blog"
description = "Posts"
author_name = "A. Writer"

[[feeds]]
kind = "atom"
url = "atom.xml"
title = "Blog"
description = "Posts"
author_name = "A. Writer"
"#,
            output.display(),
            templates.display()
        ),
    )
    .unwrap();

    let config = Config::load(&config_path).unwrap();
    let renderer = Renderer::from_config(&config);
    let writer = DirectoryWriter::from_config(&config);
    let items = vec![post("Second", "second.html", Some("2020-02-02"))];

    let written = render_feeds(&config, &items, &renderer, &writer).unwrap();
    assert_eq!(written, 2);

    let channel = read_rss(&output.join("rss.xml"));
    assert_eq!(channel.items()[0].title(), Some("[Second]"));
    assert!(output.join("atom.xml").exists());
}

#[test]
fn test_file_loader_overrides_feed_template() {
    let templates = tempfile::tempdir().unwrap();
    fs::write(
        templates.path().join("rss.xml"),
        "<rss version=\"2.0\"><channel><title>{{ title }} ({{ timestamp }})</title>\
         <link>{{ absolute }}</link><description>{{ description }}</description>\
         {{ body }}</channel></rss>",
    )
    .unwrap();

    let out = tempfile::tempdir().unwrap();
    let writer = DirectoryWriter::new(out.path());
    let renderer = Renderer::new(FileTemplateLoader::new(templates.path()), "https://example.com");

    render_rss(
        &blog("rss.xml"),
        vec![post("Second", "second.html", Some("2020-02-02"))],
        &renderer,
        &writer,
    )
    .unwrap();

    let channel = read_rss(&out.path().join("rss.xml"));
    assert_eq!(channel.title(), "Blog (Sun, 02 Feb 2020 00:00:00 UT)");
    assert_eq!(channel.items().len(), 1);
}
