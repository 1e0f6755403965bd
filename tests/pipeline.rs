//! Integration tests for the conversion pipeline.
//!
//! Every external tool is replaced by a small `/bin/sh` script so the
//! routing, fallback, truncation and post-processing rules can be checked
//! without LibreOffice, Calibre, MuPDF, Inkscape, ImageMagick or svgo
//! installed. The scripts are written once, before any of them is spawned.
//!
//! Run with:
//!   cargo test --test pipeline

#![cfg(unix)]

use doc2pages::{
    ConversionProgressCallback, Converter, ConverterConfig, ConverterConfigBuilder,
    Doc2PagesError, PageFormat, PageOptions, UnknownFormatPolicy,
};
use doc2pages::pipeline::render::{render_pages, RenderTarget};
use flate2::read::GzDecoder;
use std::io::Read;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

// ── Fake tools ───────────────────────────────────────────────────────────────

const TWO_PAGE_PDF: &str =
    "%PDF-1.4\n2 0 obj << /Type /Pages /Kids [3 0 R 4 0 R] /Count 2 >> endobj\n%%EOF\n";

/// (file name, script body after the shebang)
const SCRIPTS: &[(&str, &str)] = &[
    // mutool: `show <pdf> pages` reports 3 pages; `convert -o <tmpl> <pdf> a-b`
    // writes one file per page; `convert -o <txt> <pdf>` writes text.
    (
        "mutool_ok",
        r##"case "$1" in
show)
  echo "pages:"
  echo "page 1 = 4 0 R"
  echo "page 2 = 9 0 R"
  echo "page 3 = 14 0 R"
  ;;
convert)
  tmpl="$3"
  if [ $# -ge 5 ]; then
    from=${5%-*}
    to=${5#*-}
    i=1
    n=$from
    while [ "$n" -le "$to" ]; do
      printf '<svg data-text="<">%s</svg>' "$n" > "$(printf "$tmpl" "$i")"
      i=$((i + 1))
      n=$((n + 1))
    done
  else
    echo "text of $4" > "$tmpl"
  fi
  ;;
*)
  exit 1
  ;;
esac
"##,
    ),
    (
        "mutool_partial",
        r##"[ "$1" = "convert" ] || exit 1
printf '<svg/>' > "$(printf "$3" 1)"
"##,
    ),
    (
        "mutool_fail",
        r##"echo "mutool: cannot open document" >&2
exit 2
"##,
    ),
    (
        "mutool_garbage",
        r##"echo "warning: trailing garbage"
echo "pages: unknown"
"##,
    ),
    // inkscape: -o <dst> <flag> <n> --pdf-poppler <src>
    (
        "inkscape_ok",
        r##"printf '<svg>%s</svg>' "$4" > "$2"
"##,
    ),
    (
        "inkscape_legacy",
        r##"echo "$3 $4" >> "$(dirname "$2")/inkscape.log"
[ "$3" = "--pdf-page" ] && exit 1
printf '<svg>%s</svg>' "$4" > "$2"
"##,
    ),
    (
        "inkscape_fail",
        r##"echo "inkscape: unknown option" >&2
exit 1
"##,
    ),
    (
        "inkscape_fail_from_2",
        r##"[ "$4" -ge 2 ] && exit 1
printf '<svg>%s</svg>' "$4" > "$2"
"##,
    ),
    (
        "inkscape_silent_from_2",
        r##"[ "$4" -ge 2 ] && exit 0
printf '<svg>%s</svg>' "$4" > "$2"
"##,
    ),
    // convert: <src> <dst>
    (
        "convert_ok",
        r##"cp "$1" "$2"
"##,
    ),
    (
        "convert_fail_on_2",
        r##"case "$1" in
*/2.png) exit 1 ;;
esac
cp "$1" "$2"
"##,
    ),
    // soffice --headless --convert-to pdf --outdir <ws> <src>
    (
        "soffice",
        r##"name=$(basename "$6")
printf '%%PDF-1.4\n2 0 obj << /Type /Pages /Kids [3 0 R 4 0 R] /Count 2 >> endobj\n%%%%EOF\n' > "$5/${name%.*}.pdf"
"##,
    ),
    (
        "soffice_silent",
        r##"exit 0
"##,
    ),
    // ebook-convert <src> <dst> …
    (
        "ebook_convert",
        r##"echo "$@" > "$(dirname "$2")/ebook.args"
printf '%%PDF-1.4\n2 0 obj << /Type /Pages /Kids [3 0 R 4 0 R] /Count 2 >> endobj\n%%%%EOF\n' > "$2"
"##,
    ),
    // svgo -f <folder>
    (
        "svgo_ok",
        r##"touch "$2/svgo.ran"
"##,
    ),
    (
        "svgo_fail",
        r##"exit 1
"##,
    ),
];

fn tools() -> &'static Path {
    static TOOLS: OnceLock<tempfile::TempDir> = OnceLock::new();
    TOOLS
        .get_or_init(|| {
            let dir = tempfile::tempdir().unwrap();
            for (name, body) in SCRIPTS {
                let path = dir.path().join(name);
                std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
                std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            }
            dir
        })
        .path()
}

fn tool(name: &str) -> PathBuf {
    tools().join(name)
}

// ── Test helpers ─────────────────────────────────────────────────────────────

/// A builder wired to the well-behaved fakes, with pdfium pointed at a
/// library that does not exist.
fn builder(cache: &Path) -> ConverterConfigBuilder {
    ConverterConfig::builder()
        .cache_root(cache)
        .timeout(Duration::from_secs(30))
        .soffice(tool("soffice"))
        .ebook_convert(tool("ebook_convert"))
        .mutool(tool("mutool_ok"))
        .inkscape(tool("inkscape_ok"))
        .imagemagick(tool("convert_ok"))
        .svgo(tool("svgo_ok"))
        .pdfium_library(cache.join("libpdfium-missing.so"))
}

fn converter(cache: &Path, f: impl FnOnce(ConverterConfigBuilder) -> ConverterConfigBuilder) -> Converter {
    Converter::new(f(builder(cache)).build().unwrap())
}

fn source(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, TWO_PAGE_PDF).unwrap();
    path
}

fn file_names(pages: &[doc2pages::Page]) -> Vec<String> {
    pages
        .iter()
        .map(|p| p.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ConversionProgressCallback for Recorder {
    fn on_conversion_start(&self, total_pages: usize) {
        self.events.lock().unwrap().push(format!("start {total_pages}"));
    }

    fn on_page_complete(&self, page_num: usize, total_pages: usize, _path: &Path) {
        self.events
            .lock()
            .unwrap()
            .push(format!("page {page_num}/{total_pages}"));
    }

    fn on_page_error(&self, page_num: usize, total_pages: usize, _error: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("error {page_num}/{total_pages}"));
    }

    fn on_conversion_complete(&self, total_pages: usize, success_count: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("done {success_count}/{total_pages}"));
    }
}

// ── Routing / to-PDF ─────────────────────────────────────────────────────────

#[tokio::test]
async fn office_document_goes_through_soffice() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "report.v2.docx");
    let mut c = converter(&tmp.path().join("cache"), |b| b);

    let pdf = c.convert_to_pdf(&src).await.unwrap();
    let ws = c.workspace().to_path_buf();
    assert_eq!(pdf, ws.join("report.v2.pdf"));
    assert!(pdf.is_file());
}

#[tokio::test]
async fn txt_and_umd_go_through_soffice() {
    let tmp = tempfile::tempdir().unwrap();
    let mut c = converter(&tmp.path().join("cache"), |b| b);

    let txt = c.convert_to_pdf(&source(tmp.path(), "notes.txt")).await.unwrap();
    assert_eq!(txt.file_name().unwrap(), "notes.pdf");
    let umd = c.convert_to_pdf(&source(tmp.path(), "novel.umd")).await.unwrap();
    assert_eq!(umd.file_name().unwrap(), "novel.pdf");
}

#[tokio::test]
async fn ebook_goes_through_calibre_with_a4_margins() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "book.EPUB");
    let mut c = converter(&tmp.path().join("cache"), |b| b);

    let pdf = c.convert_to_pdf(&src).await.unwrap();
    let ws = c.workspace().to_path_buf();
    assert_eq!(pdf, ws.join("dst.pdf"));

    let args = std::fs::read_to_string(ws.join("ebook.args")).unwrap();
    assert!(args.contains("--paper-size a4"), "{args}");
    for side in ["bottom", "left", "right", "top"] {
        assert!(args.contains(&format!("--pdf-page-margin-{side} 36")), "{args}");
    }
}

#[tokio::test]
async fn pdf_is_copied_into_workspace() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let mut c = converter(&tmp.path().join("cache"), |b| b);

    let pdf = c.convert_to_pdf(&src).await.unwrap();
    assert_eq!(pdf.file_name().unwrap(), "dst.pdf");
    assert_eq!(std::fs::read_to_string(&pdf).unwrap(), TWO_PAGE_PDF);
}

#[tokio::test]
async fn unknown_extension_follows_policy() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "drawing.vsdx");

    let mut lenient = converter(&tmp.path().join("a"), |b| b);
    let pdf = lenient.convert_to_pdf(&src).await.unwrap();
    assert_eq!(pdf.file_name().unwrap(), "drawing.pdf");

    let mut strict = converter(&tmp.path().join("b"), |b| {
        b.unknown_format(UnknownFormatPolicy::Reject)
    });
    let err = strict.convert_to_pdf(&src).await.unwrap_err();
    assert!(matches!(err, Doc2PagesError::UnsupportedFormat { .. }), "{err:?}");
}

#[tokio::test]
async fn tool_success_without_output_is_missing_output() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "report.docx");
    let mut c = converter(&tmp.path().join("cache"), |b| b.soffice(tool("soffice_silent")));

    let err = c.convert_to_pdf(&src).await.unwrap_err();
    assert!(matches!(err, Doc2PagesError::MissingOutput { .. }), "{err:?}");
}

#[tokio::test]
async fn pdf_to_text_writes_dst_txt() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let mut c = converter(&tmp.path().join("cache"), |b| b);

    let txt = c.convert_pdf_to_text(&src).await.unwrap();
    assert_eq!(txt.file_name().unwrap(), "dst.txt");
    assert!(std::fs::read_to_string(&txt).unwrap().starts_with("text of"));
}

// ── Rendering ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn mutool_pages_are_numbered_from_the_requested_start() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let mut c = converter(&tmp.path().join("cache"), |b| b);

    let batch = c.convert_pdf_to_png(&src, 2, 4).await;
    assert!(batch.is_ok(), "{:?}", batch.error);
    assert_eq!(batch.page_numbers(), vec![2, 3, 4]);
    assert_eq!(file_names(&batch.pages), vec!["1.png", "2.png", "3.png"]);
}

#[tokio::test]
async fn missing_mutool_output_truncates_without_error() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let mut c = converter(&tmp.path().join("cache"), |b| b.mutool(tool("mutool_partial")));

    let batch = c.convert_pdf_to_svg(&src, 1, 5, false, false).await;
    assert!(batch.is_ok());
    assert_eq!(batch.page_numbers(), vec![1]);
}

#[tokio::test]
async fn earlier_pages_in_the_workspace_are_not_reused() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let cache = tmp.path().join("cache");
    let mut c = converter(&cache, |b| b);

    let first = c.convert_pdf_to_svg(&src, 1, 3, false, false).await;
    assert_eq!(first.page_numbers(), vec![1, 2, 3]);

    // Same workspace, a renderer that only writes the first file.
    let workspace = c.workspace().to_path_buf();
    let config = builder(&cache).mutool(tool("mutool_partial")).build().unwrap();
    let batch = render_pages(&config, &workspace, &src, 4, 6, RenderTarget::Svg).await;
    assert!(batch.is_ok(), "{:?}", batch.error);
    assert_eq!(batch.page_numbers(), vec![4]);
    assert_eq!(std::fs::read_to_string(&batch.pages[0].path).unwrap(), "<svg/>");
    assert!(!workspace.join("2.svg").exists());
    assert!(!workspace.join("3.svg").exists());
}

#[tokio::test]
async fn inkscape_does_not_reuse_earlier_pages() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let cache = tmp.path().join("cache");
    let mut c = converter(&cache, |b| b);

    let first = c.convert_pdf_to_svg(&src, 1, 3, false, false).await;
    assert_eq!(first.page_numbers(), vec![1, 2, 3]);

    let workspace = c.workspace().to_path_buf();
    let config = builder(&cache)
        .mutool(tool("mutool_fail"))
        .inkscape(tool("inkscape_silent_from_2"))
        .build()
        .unwrap();
    let batch = render_pages(&config, &workspace, &src, 1, 3, RenderTarget::Svg).await;
    assert!(batch.is_ok(), "{:?}", batch.error);
    assert_eq!(batch.page_numbers(), vec![1]);
    assert_eq!(std::fs::read_to_string(&batch.pages[0].path).unwrap(), "<svg>1</svg>");
}

#[tokio::test]
async fn mutool_failure_falls_back_to_inkscape() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let mut c = converter(&tmp.path().join("cache"), |b| b.mutool(tool("mutool_fail")));

    let batch = c.convert_pdf_to_svg(&src, 3, 5, false, false).await;
    assert!(batch.is_ok(), "{:?}", batch.error);
    assert_eq!(batch.page_numbers(), vec![3, 4, 5]);
    assert_eq!(file_names(&batch.pages), vec!["1.svg", "2.svg", "3.svg"]);
    assert_eq!(
        std::fs::read_to_string(&batch.pages[0].path).unwrap(),
        "<svg>3</svg>"
    );
}

#[tokio::test]
async fn inkscape_tries_pdf_page_before_pages() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let mut c = converter(&tmp.path().join("cache"), |b| {
        b.mutool(tool("mutool_fail")).inkscape(tool("inkscape_legacy"))
    });

    let batch = c.convert_pdf_to_svg(&src, 1, 2, false, false).await;
    assert_eq!(batch.page_numbers(), vec![1, 2]);

    let log = std::fs::read_to_string(c.workspace().join("inkscape.log")).unwrap();
    let calls: Vec<&str> = log.lines().collect();
    assert_eq!(
        calls,
        vec!["--pdf-page 1", "--pages 1", "--pdf-page 2", "--pages 2"]
    );
}

#[tokio::test]
async fn both_renderers_failing_returns_the_error() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let mut c = converter(&tmp.path().join("cache"), |b| {
        b.mutool(tool("mutool_fail")).inkscape(tool("inkscape_fail"))
    });

    let batch = c.convert_pdf_to_png(&src, 1, 3).await;
    assert!(batch.is_empty());
    match batch.error {
        Some(Doc2PagesError::ToolFailed { tool, output, .. }) => {
            assert_eq!(tool, "inkscape_fail");
            assert!(output.contains("unknown option"));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn inkscape_partial_failure_keeps_earlier_pages() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let mut c = converter(&tmp.path().join("cache"), |b| {
        b.mutool(tool("mutool_fail")).inkscape(tool("inkscape_fail_from_2"))
    });

    let batch = c.convert_pdf_to_svg(&src, 1, 3, false, true).await;
    assert_eq!(batch.page_numbers(), vec![1]);
    assert!(batch.error.is_some());
    // Post-processing is skipped when rendering stopped on an error.
    assert_eq!(file_names(&batch.pages), vec!["1.svg"]);
}

#[tokio::test]
async fn inkscape_missing_output_truncates_without_error() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let mut c = converter(&tmp.path().join("cache"), |b| {
        b.mutool(tool("mutool_fail")).inkscape(tool("inkscape_silent_from_2"))
    });

    let batch = c.convert_pdf_to_svg(&src, 1, 3, false, false).await;
    assert!(batch.is_ok());
    assert_eq!(batch.page_numbers(), vec![1]);
}

// ── Post-processing ──────────────────────────────────────────────────────────

#[tokio::test]
async fn jpg_pages_replace_their_pngs() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let mut c = converter(&tmp.path().join("cache"), |b| b);

    let batch = c
        .convert_pdf_to_pages(&src, 1, 3, &PageOptions::new(PageFormat::Jpg))
        .await;
    assert_eq!(file_names(&batch.pages), vec!["1.jpg", "2.jpg", "3.jpg"]);
    for page in &batch.pages {
        assert!(page.path.is_file());
        assert!(!page.path.with_extension("png").exists());
    }
}

#[tokio::test]
async fn failed_jpg_conversion_keeps_the_png() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let mut c = converter(&tmp.path().join("cache"), |b| {
        b.imagemagick(tool("convert_fail_on_2"))
    });

    let batch = c
        .convert_pdf_to_pages(&src, 1, 3, &PageOptions::new(PageFormat::Jpg))
        .await;
    assert!(batch.is_ok());
    assert_eq!(file_names(&batch.pages), vec!["1.jpg", "2.png", "3.jpg"]);
    assert!(batch.pages[1].path.is_file());
}

#[tokio::test]
async fn webp_pages_use_webp_extension() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let mut c = converter(&tmp.path().join("cache"), |b| b);

    let batch = c
        .convert_pdf_to_pages(&src, 1, 2, &PageOptions::new(PageFormat::Webp))
        .await;
    assert_eq!(file_names(&batch.pages), vec!["1.webp", "2.webp"]);
}

#[tokio::test]
async fn svg_pages_are_minified_and_gzipped() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let mut c = converter(&tmp.path().join("cache"), |b| b);

    let options = PageOptions::new(PageFormat::Svg).svgo(true).gzip(true);
    let batch = c.convert_pdf_to_pages(&src, 1, 2, &options).await;
    assert!(batch.is_ok(), "{:?}", batch.error);
    assert_eq!(file_names(&batch.pages), vec!["1.gzip.svg", "2.gzip.svg"]);

    let ws = c.workspace().to_path_buf();
    assert!(ws.join("svgo.ran").exists());
    assert!(!ws.join("1.svg").exists());

    let mut decoded = String::new();
    GzDecoder::new(std::fs::File::open(&batch.pages[0].path).unwrap())
        .read_to_string(&mut decoded)
        .unwrap();
    assert_eq!(decoded, r#"<svg data-text="&lt;">1</svg>"#);
}

#[tokio::test]
async fn svgo_failure_does_not_stop_gzip() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let mut c = converter(&tmp.path().join("cache"), |b| b.svgo(tool("svgo_fail")));

    let batch = c.convert_pdf_to_svg(&src, 1, 2, true, true).await;
    assert!(batch.is_ok());
    assert_eq!(file_names(&batch.pages), vec!["1.gzip.svg", "2.gzip.svg"]);
}

#[tokio::test]
async fn convert_image_passes_extra_args_before_destination() {
    let tmp = tempfile::tempdir().unwrap();
    let src = tmp.path().join("in.png");
    std::fs::write(&src, b"png").unwrap();
    let dst = tmp.path().join("out.png");
    let c = converter(&tmp.path().join("cache"), |b| b);

    // `cp in.png -resize out.png` fails; with no extra args it succeeds.
    assert!(c.convert_image(&src, &dst, &["-resize"]).await.is_err());
    c.convert_image::<&str>(&src, &dst, &[]).await.unwrap();
    assert!(dst.is_file());
}

// ── Page counting ────────────────────────────────────────────────────────────

#[tokio::test]
async fn page_count_prefers_mutool() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let c = converter(&tmp.path().join("cache"), |b| b);

    assert_eq!(c.count_pdf_pages(&src).await.unwrap(), 3);
}

#[tokio::test]
async fn unparsable_mutool_output_falls_back_to_byte_scan() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let c = converter(&tmp.path().join("cache"), |b| b.mutool(tool("mutool_garbage")));

    assert_eq!(c.count_pdf_pages(&src).await.unwrap(), 2);
}

// ── End to end ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn convert_document_runs_every_stage_and_reports_progress() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "deck.pptx");
    let recorder = Arc::new(Recorder::default());
    let mut c = converter(&tmp.path().join("cache"), |b| {
        b.progress_callback(recorder.clone() as Arc<dyn ConversionProgressCallback>)
    });

    let out = c
        .convert_document(&src, 2, None, &PageOptions::new(PageFormat::Png))
        .await
        .unwrap();
    assert_eq!(out.pdf.file_name().unwrap(), "deck.pdf");
    assert_eq!(out.total_pages, 3);
    assert_eq!((out.from_page, out.to_page), (2, 3));
    assert_eq!(out.pages.page_numbers(), vec![2, 3]);
    assert_eq!(
        recorder.events(),
        vec!["start 2", "page 2/2", "page 3/2", "done 2/2"]
    );
}

#[tokio::test]
async fn convert_document_clamps_last_page() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let mut c = converter(&tmp.path().join("cache"), |b| b);

    let out = c
        .convert_document(&src, 1, Some(10), &PageOptions::default())
        .await
        .unwrap();
    assert_eq!(out.to_page, 3);
    assert_eq!(out.pages.len(), 3);
}

#[tokio::test]
async fn progress_reports_the_page_that_stopped_generation() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let recorder = Arc::new(Recorder::default());
    let mut c = converter(&tmp.path().join("cache"), |b| {
        b.mutool(tool("mutool_fail"))
            .inkscape(tool("inkscape_fail_from_2"))
            .progress_callback(recorder.clone() as Arc<dyn ConversionProgressCallback>)
    });

    let batch = c
        .convert_pdf_to_pages(&src, 1, 3, &PageOptions::new(PageFormat::Svg))
        .await;
    assert_eq!(batch.len(), 1);
    assert_eq!(
        recorder.events(),
        vec!["start 3", "page 1/3", "error 2/3", "done 1/3"]
    );
}

#[tokio::test]
async fn clean_removes_all_generated_files() {
    let tmp = tempfile::tempdir().unwrap();
    let src = source(tmp.path(), "paper.pdf");
    let mut c = converter(&tmp.path().join("cache"), |b| b);

    let out = c
        .convert_document(&src, 1, None, &PageOptions::new(PageFormat::Svg))
        .await
        .unwrap();
    let ws = out.pdf.parent().unwrap().to_path_buf();
    assert!(ws.join("1.svg").exists());

    c.clean().unwrap();
    assert!(!ws.exists());
    assert_ne!(c.workspace(), ws.as_path());
}

// ── Probes ───────────────────────────────────────────────────────────────────

#[test]
fn probes_resolve_configured_paths() {
    let tmp = tempfile::tempdir().unwrap();
    let c = converter(&tmp.path().join("cache"), |b| {
        b.inkscape(tmp.path().join("no-inkscape"))
    });

    assert_eq!(c.check_mupdf().unwrap(), tool("mutool_ok"));
    assert_eq!(c.check_soffice().unwrap(), tool("soffice"));
    assert_eq!(c.check_calibre().unwrap(), tool("ebook_convert"));
    assert_eq!(c.check_svgo().unwrap(), tool("svgo_ok"));
    assert_eq!(c.check_imagemagick().unwrap(), tool("convert_ok"));
    assert!(matches!(
        c.check_inkscape(),
        Err(Doc2PagesError::ToolNotFound { .. })
    ));

    let statuses = c.check_tools();
    assert_eq!(statuses.len(), 6);
    assert_eq!(statuses.iter().filter(|s| s.is_available()).count(), 5);
}
