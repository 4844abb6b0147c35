//! Loop expansion.
//!
//! Each container is scanned once. The scan yields a plan of regions, and a
//! new item sequence is materialised in a single pass: items outside every
//! region are moved across unchanged, each region is replaced by its
//! template cloned once per record. Zero records drop the whole region,
//! markers included.

use crate::data::{DataContext, Record};
use crate::error::{Error, Result};
use crate::generator::{ErrorMode, GenerationStats};
use crate::model::{
    clone_table_items, Block, Document, Paragraph, StructuralClone, Table, TableItem, TableRow,
};

use super::markers::{detect_regions, LoopRegion, RegionScan};
use super::placeholder::{strip_markers, substitute_paragraph};

/// Expand row loops in every top-level table.
pub fn expand_table_loops(
    document: &mut Document,
    data: &DataContext,
    mode: ErrorMode,
    stats: &mut GenerationStats,
) -> Result<()> {
    for (index, table) in document.tables_mut().enumerate() {
        expand_table(table, &format!("table {}", index + 1), data, mode, stats)?;
    }
    Ok(())
}

/// Expand row loops in one table.
pub fn expand_table(
    table: &mut Table,
    container: &str,
    data: &DataContext,
    mode: ErrorMode,
    stats: &mut GenerationStats,
) -> Result<()> {
    let texts: Vec<Option<String>> = table
        .content
        .iter()
        .map(|item| item.as_row().map(TableRow::plain_text))
        .collect();
    let scan = detect_regions(container, &texts);
    report(&scan, mode, stats)?;
    if scan.regions.is_empty() {
        return Ok(());
    }

    let items = std::mem::take(&mut table.content);
    table.content = materialize(items, &scan.regions, |region, template| {
        let records = data.loop_records(&region.name);
        let rows = template.iter().filter(|item| item.as_row().is_some()).count();
        log::debug!(
            "{container}: expanding loop '{}' ({} rows x {} records)",
            region.name,
            rows,
            records.len()
        );
        stats.table_loops += 1;
        stats.rows_inserted += rows * records.len();

        let mut out = Vec::with_capacity(template.len() * records.len());
        for record in &records {
            for item in clone_table_items(template.iter().copied()) {
                out.push(match item {
                    TableItem::Row(mut row) => {
                        stats.record(fill_row(&mut row, record));
                        TableItem::Row(row)
                    }
                    opaque => opaque,
                });
            }
        }
        out
    });
    Ok(())
}

/// Expand loops over top-level body blocks.
pub fn expand_body_loops(
    document: &mut Document,
    data: &DataContext,
    mode: ErrorMode,
    stats: &mut GenerationStats,
) -> Result<()> {
    let texts: Vec<Option<String>> = document
        .blocks
        .iter()
        .map(|b| b.as_paragraph().map(|p| p.plain_text()))
        .collect();
    let scan = detect_regions("body", &texts);
    report(&scan, mode, stats)?;
    if scan.regions.is_empty() {
        return Ok(());
    }

    let blocks = std::mem::take(&mut document.blocks);
    document.blocks = materialize(blocks, &scan.regions, |region, template| {
        let records = data.loop_records(&region.name);
        log::debug!(
            "body: expanding loop '{}' ({} blocks x {} records)",
            region.name,
            template.len(),
            records.len()
        );
        stats.body_loops += 1;
        stats.blocks_inserted += template.len() * records.len();
        records
            .iter()
            .flat_map(|record| template.iter().map(move |block| fill_block(block, record)))
            .map(|(block, outcome)| {
                stats.record(outcome);
                block
            })
            .collect()
    });
    Ok(())
}

/// Substitution counts for one filled clone.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FillOutcome {
    pub replaced: usize,
    pub collapsed: usize,
}

/// Fill a freshly cloned row in place.
fn fill_row(row: &mut TableRow, record: &Record) -> FillOutcome {
    let mut outcome = FillOutcome::default();
    for paragraph in row.paragraphs_mut() {
        let rewrite = substitute_paragraph(paragraph, record);
        outcome.replaced += rewrite.replaced;
        outcome.collapsed += usize::from(rewrite.collapsed);
        strip_markers(paragraph);
    }
    outcome
}

fn fill_block(template: &Block, record: &Record) -> (Block, FillOutcome) {
    let mut block = template.structural_clone();
    let mut outcome = FillOutcome::default();
    block.for_each_paragraph_mut(&mut |paragraph: &mut Paragraph| {
        let rewrite = substitute_paragraph(paragraph, record);
        outcome.replaced += rewrite.replaced;
        outcome.collapsed += usize::from(rewrite.collapsed);
        strip_markers(paragraph);
    });
    (block, outcome)
}

/// Apply the error mode to a scan's issues.
fn report(scan: &RegionScan, mode: ErrorMode, stats: &mut GenerationStats) -> Result<()> {
    if let (ErrorMode::Strict, Some(issue)) = (mode, scan.issues.first()) {
        return Err(Error::MalformedTemplate {
            container: issue.container.clone(),
            detail: issue.kind.to_string(),
        });
    }
    for issue in &scan.issues {
        log::warn!("malformed loop markers in {issue}; left as literal text");
        stats.issues.push(issue.clone());
    }
    Ok(())
}

/// Build the output sequence from a region plan.
///
/// `render` receives each region with its template items and returns the
/// items that replace the whole region.
fn materialize<T>(
    items: Vec<T>,
    regions: &[LoopRegion],
    mut render: impl FnMut(&LoopRegion, &[&T]) -> Vec<T>,
) -> Vec<T> {
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut out = Vec::with_capacity(slots.len());
    let mut cursor = 0;

    for region in regions {
        out.extend(slots[cursor..region.start].iter_mut().filter_map(Option::take));
        let template: Vec<&T> = slots[region.template_range()].iter().flatten().collect();
        out.extend(render(region, &template));
        cursor = region.end + 1;
    }
    out.extend(slots[cursor..].iter_mut().filter_map(Option::take));
    out
}
