use super::*;
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn create_temp_markdown_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

const SAMPLE_DECK: &str = "% Big Talk\n% Ann Author\n% 2024-05-01\n\n\
Welcome everyone.\n\n\
# Agenda\n\n\
* Intro\n* Demo\n\n\
# Demo\n\n\
```rust\nfn main() {}\n```\n\n\
#Closing\n\n\
![logo](img/logo.png)\n";

#[test]
fn test_parse_sample_deck() {
    let pages = MarkdownParser.parse(SAMPLE_DECK).unwrap();

    let titles: Vec<&str> = pages.iter().map(|p| p.title()).collect();
    assert_eq!(titles, vec!["Big Talk", "Agenda", "Demo", "Closing"]);

    match pages[0].kind() {
        PageKind::Title(info) => {
            assert_eq!(info.author.as_deref(), Some("Ann Author"));
            assert_eq!(info.date.as_deref(), Some("2024-05-01"));
            assert!(info.theme.is_none());
        }
        PageKind::Regular => panic!("first page should be the title page"),
    }
    assert_eq!(
        pages[0].blocks(),
        &[Block::Paragraph("Welcome everyone.".to_string())]
    );
    assert_eq!(
        pages[1].blocks(),
        &[
            Block::Item("Intro".to_string()),
            Block::Item("Demo".to_string())
        ]
    );
    assert!(matches!(
        &pages[2].blocks()[0],
        Block::Code { language, text } if language == "rust" && text == "fn main() {}\n"
    ));
    assert_eq!(
        pages[3].blocks(),
        &[Block::Image {
            url: "img/logo.png".to_string(),
            alt: "logo".to_string()
        }]
    );
}

#[test]
fn test_parse_errors_report_line() {
    let err = MarkdownParser.parse("intro\n\n# One\n").unwrap_err();
    assert!(err.is_parse_error());
    assert!(matches!(err, DeckError::ParseError { line: 1, .. }));

    let err = MarkdownParser.parse("%\n# One\n").unwrap_err();
    assert!(err.is_parse_error());

    let err = MarkdownParser
        .parse("% T\n% A\n% D\n% extra\n# One\n")
        .unwrap_err();
    assert!(matches!(err, DeckError::ParseError { line: 4, .. }));
}

#[test]
fn test_empty_document_has_no_pages() {
    assert!(MarkdownParser.parse("").unwrap().is_empty());
}

#[test]
fn test_digit_count() {
    assert_eq!(digit_count(0), 1);
    assert_eq!(digit_count(1), 1);
    assert_eq!(digit_count(9), 1);
    assert_eq!(digit_count(10), 2);
    assert_eq!(digit_count(99), 2);
    assert_eq!(digit_count(100), 3);
    assert_eq!(digit_count(150), 3);
}

#[test]
fn test_image_type_normalization() {
    assert_eq!(normalize_image_type("PNG"), "png");
    assert_eq!(normalize_image_type("JPG"), "jpeg");
    assert_eq!(normalize_image_type("image/jpg"), "jpeg");
    assert_eq!(normalize_image_type("jpeg"), "jpeg");
    assert!(export::image_format("png").is_ok());
    assert!(export::image_format("nope").is_err());
}

#[test]
fn test_image_file_name() {
    assert_eq!(
        export::image_file_name("out/slide_", 7, 150, "jpeg"),
        "out/slide_007.jpeg"
    );
    assert_eq!(export::image_file_name("s", 3, 5, "png"), "s3.png");
    assert_eq!(export::image_file_name("s", 10, 11, "png"), "s10.png");
}

#[test]
fn test_file_source_tracks_reads() {
    let file = create_temp_markdown_file("# One\n");
    let mut source = FileSource::new(file.path());

    assert!(source.is_modified());
    assert_eq!(source.read().unwrap(), "# One\n");
    assert!(!source.is_modified());
    assert_eq!(source.name(), file.path().to_string_lossy());
}

#[test]
fn test_file_source_paths() {
    let source = FileSource::new("/decks/talk.md");
    assert_eq!(
        source.full_path("img/a.png"),
        Some(std::path::PathBuf::from("/decks/img/a.png"))
    );
    assert_eq!(
        source.full_path("/abs/a.png"),
        Some(std::path::PathBuf::from("/abs/a.png"))
    );
    assert_eq!(
        source.tmp_dir(),
        Some(std::env::temp_dir().join("big-deck").join("talk"))
    );
}

#[test]
fn test_missing_file_source() {
    let mut source = FileSource::new("/definitely/not/here.md");
    assert!(!source.is_modified());
    assert!(matches!(
        source.read(),
        Err(DeckError::PathNotFoundError(_))
    ));
}

#[test]
fn test_canvas_over_file_source() {
    let file = create_temp_markdown_file(SAMPLE_DECK);
    let mut canvas = Canvas::new(ImageRenderer::new(64, 36));

    assert!(canvas.parse_source(Box::new(FileSource::new(file.path()))));
    assert_eq!(canvas.title(), "Big Talk");
    assert_eq!(canvas.page_count(), 4);
    assert!(!canvas.needs_reload());

    canvas.move_to_last();
    assert_eq!(canvas.renderer().title(), "Big Talk: Closing");
    canvas.refresh_display().unwrap();
    assert_eq!(canvas.renderer().frame().unwrap().dimensions(), (64, 36));
}

#[test]
fn test_print_renderer_writes_handout() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("handouts").join("talk.txt");
    let mut canvas = Canvas::new(PrintRenderer::new(&output));
    canvas.parse_source(Box::new(MemorySource::new(SAMPLE_DECK)));

    let outcome = canvas.print_all().unwrap();

    assert_eq!(outcome, JobOutcome::Completed);
    assert_eq!(canvas.renderer().sheets().len(), 4);
    let handout = fs::read_to_string(&output).expect("Failed to read handout");
    assert!(handout.starts_with("Printed "));
    assert!(handout.contains("== 2. Agenda ==\n  - Intro\n  - Demo\n"));
    assert!(handout.contains("[image: logo (img/logo.png)]"));
}

#[test]
fn test_config_defaults() {
    let config = Config::new();
    assert!(config.theme.is_none());
    assert_eq!((config.width, config.height), (1280, 720));

    let render = config.get_render_config(Some(320), None, Some("bmp".to_string()), None);
    assert_eq!((render.width, render.height), (320, 720));
    assert_eq!(render.format, "bmp");
    assert_eq!(render.base_name, "slide_");

    let watch = config.get_watch_config("a.md".into(), "out".into(), Some("dark".to_string()));
    assert_eq!(watch.theme.as_deref(), Some("dark"));
    assert_eq!(watch.debounce_ms, 500);
}

#[test]
fn test_prepare_target_creates_directory() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let nested = dir.path().join("a").join("b");

    export::prepare_target(&nested.join("slide_0.png")).unwrap();

    assert!(nested.is_dir());
    // The write check leaves nothing behind
    assert_eq!(fs::read_dir(&nested).unwrap().count(), 0);
}

#[test]
fn test_prepare_target_rejects_file_as_directory() {
    let file = create_temp_markdown_file("not a directory");
    let target = file.path().join("slide_0.png");

    assert!(matches!(
        export::prepare_target(&target),
        Err(DeckError::ValidationError(_))
    ));
}

#[test]
fn test_file_source_open() {
    let file = create_temp_markdown_file("# One\n");
    assert!(FileSource::open(file.path()).is_ok());

    assert!(matches!(
        FileSource::open("/definitely/not/here.md"),
        Err(DeckError::PathNotFoundError(_))
    ));

    let dir = TempDir::new().expect("Failed to create temp dir");
    assert!(matches!(
        FileSource::open(dir.path()),
        Err(DeckError::ValidationError(_))
    ));
}

#[test]
fn test_open_deck_applies_requested_theme() {
    let file = create_temp_markdown_file(SAMPLE_DECK);
    let render = RenderConfig {
        width: 32,
        height: 18,
        ..RenderConfig::default()
    };

    let canvas = open_deck(file.path(), Some("dark"), &render).unwrap();
    assert_eq!(canvas.theme_name(), Some("dark"));
    assert!(canvas
        .deck()
        .pages()
        .iter()
        .all(|p| p.style().map(|s| s.theme.as_str()) == Some("dark")));

    assert!(matches!(
        open_deck(file.path(), Some("neon"), &render),
        Err(DeckError::UnknownTheme(_))
    ));

    let empty = create_temp_markdown_file("");
    assert!(open_deck(empty.path(), None, &render).is_err());
}

#[test]
fn test_watch_path_relevance() {
    let file = create_temp_markdown_file("# One\n");
    assert!(watch::is_relevant_path(file.path(), file.path()));
    assert!(!watch::is_relevant_path(
        std::path::Path::new("/nope/other.md"),
        file.path()
    ));
}

#[test]
fn test_watcher_errors_convert() {
    let err: DeckError = notify::Error::generic("inotify limit reached").into();
    assert!(matches!(err, DeckError::WatchError(ref m) if m.contains("inotify limit reached")));
}
