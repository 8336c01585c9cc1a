//! PDF rendering. The layout walks a top-down cursor; printpdf's origin is
//! the bottom-left corner, so [`at`] flips the coordinate at each draw.

use chrono::NaiveDate;
use printpdf::{
    BuiltinFont, Mm, PdfDocument, PdfDocumentReference, PdfLayerIndex, PdfLayerReference,
    PdfPageIndex,
};

use crate::analysis::AnalysisResult;
use crate::error::{Error, Result};
use crate::metrics::PerformanceMetrics;
use crate::period::Period;

// A4 portrait, millimetres.
const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const LINE_HEIGHT: f64 = 6.0;
const MM_PER_PT: f64 = 0.352_778;

fn mm(v: f64) -> Mm {
    Mm(v as _)
}

/// Flip a top-down y coordinate into printpdf's bottom-up space.
fn at(y: f64) -> Mm {
    mm(PAGE_HEIGHT - y)
}

/// Greedy word wrap sized for Helvetica, whose average glyph runs about
/// half the point size wide. Words longer than the limit get a line of
/// their own.
fn wrap(text: &str, width_mm: f64, font_size: f64) -> Vec<String> {
    let max_chars = (width_mm / (font_size * 0.5 * MM_PER_PT)).max(1.0) as usize;
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > max_chars {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn new_page(
    doc: &PdfDocumentReference,
    pages: &mut Vec<(PdfPageIndex, PdfLayerIndex)>,
) -> PdfLayerReference {
    let (page, layer) = doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
    pages.push((page, layer));
    doc.get_page(page).get_layer(layer)
}

/// Render the PDF report to bytes. `generated` is stamped into the footer
/// of every page.
pub fn render(
    analysis: &AnalysisResult,
    metrics: &PerformanceMetrics,
    generated: NaiveDate,
) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        "Arête Performance Report",
        mm(PAGE_WIDTH),
        mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| Error::Report(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| Error::Report(e.to_string()))?;

    let mut pages = vec![(first_page, first_layer)];
    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut y = 20.0;

    // ── Cover ──────────────────────────────────────────────────────

    layer.use_text("Arête Performance Report", 24.0, mm(20.0), at(y), &bold);
    y += LINE_HEIGHT + 10.0;
    let period_label = match metrics.period {
        Period::Weekly => "Weekly",
        Period::Monthly => "Monthly",
    };
    layer.use_text(
        format!("{period_label} Analysis"),
        14.0,
        mm(20.0),
        at(y),
        &font,
    );
    y += LINE_HEIGHT + 5.0;
    layer.use_text(
        format!(
            "{} - {}",
            metrics.date_range.start.format("%b %d"),
            metrics.date_range.end.format("%b %d, %Y")
        ),
        14.0,
        mm(20.0),
        at(y),
        &font,
    );

    layer.use_text(
        analysis.score.to_string(),
        18.0,
        mm(PAGE_WIDTH - 45.0),
        at(45.0),
        &bold,
    );
    layer.use_text("/100", 10.0, mm(PAGE_WIDTH - 35.0), at(50.0), &bold);

    // ── Body ───────────────────────────────────────────────────────

    layer = new_page(&doc, &mut pages);
    y = 20.0;

    layer.use_text("Key Performance Indicators", 16.0, mm(20.0), at(y), &bold);
    y += LINE_HEIGHT + 10.0;

    let a = &metrics.aggregates;
    let kpis = [
        (
            "Tasks Completed",
            format!("{}/{}", a.tasks_completed, a.tasks_created),
        ),
        ("Completion Rate", format!("{}%", a.completion_rate)),
        ("On-Time Delivery", format!("{}%", a.on_time_rate)),
        ("Estimate Accuracy", format!("{}%", a.estimate_accuracy)),
        ("Average Cycle Time", format!("{} days", a.avg_cycle_days)),
        ("Overdue Tasks", a.overdue_count.to_string()),
    ];
    for (label, value) in &kpis {
        layer.use_text(format!("{label}:"), 12.0, mm(20.0), at(y), &font);
        layer.use_text(value.as_str(), 12.0, mm(80.0), at(y), &bold);
        y += 8.0;
    }
    y += 10.0;

    layer.use_text("Performance Analysis", 16.0, mm(20.0), at(y), &bold);
    y += LINE_HEIGHT + 10.0;
    for line in wrap(&analysis.narrative, PAGE_WIDTH - 40.0, 11.0) {
        layer.use_text(line, 11.0, mm(20.0), at(y), &font);
        y += LINE_HEIGHT;
    }
    y += 10.0;

    layer.use_text("Key Insights", 14.0, mm(20.0), at(y), &bold);
    y += LINE_HEIGHT + 5.0;
    for bullet in &analysis.bullets {
        layer.use_text("\u{2022}", 11.0, mm(20.0), at(y), &font);
        for line in wrap(bullet, PAGE_WIDTH - 45.0, 11.0) {
            layer.use_text(line, 11.0, mm(25.0), at(y), &font);
            y += LINE_HEIGHT;
        }
        y += 2.0;
    }
    y += 10.0;

    // ── Recommendations ────────────────────────────────────────────

    if y > PAGE_HEIGHT - 60.0 {
        layer = new_page(&doc, &mut pages);
        y = 20.0;
    }

    layer.use_text("Recommended Actions", 16.0, mm(20.0), at(y), &bold);
    y += LINE_HEIGHT + 10.0;

    for (i, action) in analysis.actions.iter().enumerate() {
        if y > PAGE_HEIGHT - 40.0 {
            layer = new_page(&doc, &mut pages);
            y = 20.0;
        }

        for line in wrap(
            &format!("{}. {}", i + 1, action.title),
            PAGE_WIDTH - 40.0,
            11.0,
        ) {
            layer.use_text(line, 11.0, mm(20.0), at(y), &bold);
            y += LINE_HEIGHT;
        }
        y += 2.0;
        layer.use_text(
            format!("Impact: {} | Effort: {}", action.impact, action.effort),
            11.0,
            mm(25.0),
            at(y),
            &font,
        );
        y += LINE_HEIGHT + 2.0;
        layer.use_text(format!("Target: {}", action.metric), 11.0, mm(25.0), at(y), &font);
        y += LINE_HEIGHT + 5.0;
    }

    // ── Footer, every page ─────────────────────────────────────────

    let total = pages.len();
    let stamp = format!("Generated by Arête - {}", generated.format("%b %d, %Y"));
    for (i, (page, layer_index)) in pages.iter().enumerate() {
        let footer = doc.get_page(*page).get_layer(*layer_index);
        footer.use_text(stamp.as_str(), 8.0, mm(20.0), at(PAGE_HEIGHT - 10.0), &font);
        footer.use_text(
            format!("Page {} of {total}", i + 1),
            8.0,
            mm(PAGE_WIDTH - 30.0),
            at(PAGE_HEIGHT - 10.0),
            &font,
        );
    }

    doc.save_to_bytes().map_err(|e| Error::Report(e.to_string()))
}
