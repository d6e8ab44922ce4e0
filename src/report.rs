use anyhow::{Context, Result, bail};
use regex::Regex;

/// A 23-underscore run printed inside every item line. It marks record
/// lines during segmentation and is never real data.
pub const ITEM_MARKER: &str = "_______________________";

/// Positional layout of the NVP1 report. The report format carries no
/// structural markup, so every offset the parser relies on lives here.
#[derive(Debug, Clone)]
pub struct ReportLayout {
    /// Warning line repeated in every unit footer; unit boundaries are
    /// derived from its occurrences.
    pub sentinel: &'static str,
    /// Line index of the first unit's code line.
    pub first_unit_line: usize,
    /// The next unit's code line sits this many lines after a sentinel.
    pub code_line_offset: usize,
    pub item_marker: &'static str,
    pub analysis_heading: &'static str,
    /// Summary pairs start this many lines after the analysis heading.
    pub analysis_skip: usize,
    pub analysis_line_count: usize,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            sentinel: "WARNING:  If the \"DEPR % OF UNFOUND ITEMS IN THIS FY:*\" is greater than 2% at year end, you will be subject to a monetary penalty.",
            first_unit_line: 4,
            code_line_offset: 8,
            item_marker: ITEM_MARKER,
            analysis_heading: "UNIT PHYSICAL INVENTORY ANALYSIS",
            analysis_skip: 2,
            analysis_line_count: 16,
        }
    }
}

/// One organizational unit's slice of the report.
#[derive(Debug, Clone)]
pub struct UnitBlock {
    pub code: String,
    pub item_lines: Vec<String>,
    pub spacing_ruler: Vec<usize>,
    pub summary_pairs: Vec<(String, String)>,
}

/// Splits the raw CRLF-separated report into unit blocks. A report with
/// `n` sentinel lines yields exactly `n` blocks; the trailing boundary
/// marks where the next unit would start and produces no block itself.
pub fn segment_report(raw: &str, layout: &ReportLayout) -> Result<Vec<UnitBlock>> {
    let code_pattern = Regex::new(r"\d{4}-\d{3}").context("failed to compile unit code regex")?;
    let ruler_pattern = Regex::new(r"^[ -]+$").context("failed to compile spacing ruler regex")?;

    let lines: Vec<&str> = raw.split("\r\n").collect();

    let mut boundaries = vec![layout.first_unit_line];
    for (index, line) in lines.iter().enumerate() {
        if line.contains(layout.sentinel) {
            boundaries.push(index + layout.code_line_offset);
        }
    }

    let mut blocks = Vec::with_capacity(boundaries.len().saturating_sub(1));
    for pair in boundaries.windows(2) {
        let end = pair[1].min(lines.len());
        let start = pair[0].min(end);
        let block = parse_unit_block(&lines[start..end], layout, &code_pattern, &ruler_pattern)
            .with_context(|| format!("malformed unit block starting at line {start}"))?;
        blocks.push(block);
    }

    Ok(blocks)
}

fn parse_unit_block(
    lines: &[&str],
    layout: &ReportLayout,
    code_pattern: &Regex,
    ruler_pattern: &Regex,
) -> Result<UnitBlock> {
    let code_line = lines.first().copied().unwrap_or_default();
    let code = code_pattern
        .find(code_line)
        .map(|found| found.as_str().to_string())
        .with_context(|| format!("no unit code in header line: {code_line:?}"))?;

    let item_lines: Vec<String> = lines
        .iter()
        .filter(|line| line.contains(layout.item_marker))
        .map(|line| (*line).to_string())
        .collect();

    let ruler_line = lines
        .iter()
        .copied()
        .find(|line| ruler_pattern.is_match(line))
        .with_context(|| format!("no spacing ruler line in unit {code}"))?;
    let spacing_ruler: Vec<usize> = ruler_line.split(' ').map(str::len).collect();

    let heading_lines: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.contains(layout.analysis_heading))
        .map(|(index, _)| index)
        .collect();
    let Some(&heading_index) = heading_lines.get(1) else {
        bail!(
            "unit {code} has {} analysis heading lines, expected at least 2",
            heading_lines.len()
        );
    };

    let start = (heading_index + layout.analysis_skip).min(lines.len());
    let end = (start + layout.analysis_line_count).min(lines.len());
    let summary_pairs: Vec<(String, String)> = lines[start..end]
        .iter()
        .filter_map(|line| {
            let (label, value) = line.split_once(':')?;
            Some((label.replace('*', ""), value.replace('*', "")))
        })
        .collect();

    Ok(UnitBlock {
        code,
        item_lines,
        spacing_ruler,
        summary_pairs,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::ReportLayout;

    /// Two-unit report laid out like a real NVP1 file: preamble on lines
    /// 0..=3, first code line at 4, and each following unit's code line
    /// exactly eight lines after the previous unit's warning sentinel.
    pub fn sample_report() -> String {
        let mut lines: Vec<String> = vec![
            "REPORT ID: NVP1".to_string(),
            "ANNUAL PHYSICAL INVENTORY AUDIT".to_string(),
            "RUN DATE: 08/05".to_string(),
            String::new(),
        ];
        lines.extend(unit_lines(
            "0200-002",
            &[
                "CHAIR 902 _______________________",
                "LAMP  523 _______________________",
            ],
        ));
        lines.extend(unit_lines("0100-001", &["DESK  117 _______________________"]));
        lines.push("END OF REPORT".to_string());
        lines.join("\r\n")
    }

    pub fn unit_lines(code: &str, items: &[&str]) -> Vec<String> {
        let layout = ReportLayout::default();
        let mut lines = vec![
            format!("2500 UNIT CODE: {code}    ANNUAL PHYSICAL INVENTORY"),
            String::new(),
            "DESC  CUR".to_string(),
            "----- ---".to_string(),
        ];
        lines.extend(items.iter().map(|item| (*item).to_string()));
        lines.push(String::new());
        lines.push(format!("{} FOLLOWS", layout.analysis_heading));
        lines.push(layout.analysis_heading.to_string());
        lines.push(String::new());
        lines.extend(summary_lines());
        lines.push(layout.sentinel.to_string());
        lines.extend(
            [
                "",
                "  PLEASE REVIEW ALL UNFOUND ITEMS WITH YOUR DEPARTMENT HEAD.",
                "",
                "PAGE  2",
                "",
                "NVP1  ANNUAL PHYSICAL INVENTORY",
                "",
            ]
            .iter()
            .map(|line| (*line).to_string()),
        );
        lines
    }

    fn summary_lines() -> Vec<String> {
        [
            "NO. OF ITEMS FOUND:*                12",
            "TOTAL NO. OF ITEMS:                 15",
            "PCT OF ITEMS FOUND:                 80.00",
            "NO. OF ITEMS NOT FOUND:             3",
            "PCT OF ITEMS NOT FOUND:             20.00",
            "ORIG COST OF ITEMS FOUND:           5,000.00",
            "ORIG COST OF ALL ITEMS:             6,000.00",
            "PCT OF ORIG COST FOUND:             83.33",
            "ORIG COST OF UNFOUND ITEMS:         1,000.00",
            "DEPR VALUE OF UNFOUND ITEMS:*       .00",
            "DEPR VALUE OF ALL ITEMS:            1,234.56",
            "PCT OF DEPR VALUE FOUND:            100.00",
            "DEPR PCT OF UNFOUND ITEMS:*         .00",
            "NO. OF ITEMS TRANSFERRED IN:        0",
            "NO. OF ITEMS TRANSFERRED OUT:       0",
            "NO. OF ITEMS ON LOAN:               0",
        ]
        .iter()
        .map(|line| (*line).to_string())
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::sample_report;
    use super::*;

    #[test]
    fn segments_one_block_per_sentinel() {
        let raw = sample_report();
        let blocks = segment_report(&raw, &ReportLayout::default()).unwrap();

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].code, "0200-002");
        assert_eq!(blocks[1].code, "0100-001");
        assert_eq!(blocks[0].item_lines.len(), 2);
        assert_eq!(blocks[1].item_lines.len(), 1);
    }

    #[test]
    fn next_unit_starts_eight_lines_after_sentinel() {
        let layout = ReportLayout::default();
        let raw = sample_report();
        let lines: Vec<&str> = raw.split("\r\n").collect();

        let sentinel_index = lines
            .iter()
            .position(|line| line.contains(layout.sentinel))
            .unwrap();
        assert!(lines[sentinel_index + layout.code_line_offset].contains("0100-001"));
    }

    #[test]
    fn ruler_tokens_become_column_widths_in_order() {
        let raw = sample_report();
        let blocks = segment_report(&raw, &ReportLayout::default()).unwrap();

        assert_eq!(blocks[0].spacing_ruler, vec![5, 3]);
        assert_eq!(blocks[1].spacing_ruler, vec![5, 3]);
    }

    #[test]
    fn summary_pairs_follow_second_heading_with_stars_stripped() {
        let raw = sample_report();
        let blocks = segment_report(&raw, &ReportLayout::default()).unwrap();
        let pairs = &blocks[0].summary_pairs;

        assert_eq!(pairs.len(), 16);
        assert_eq!(pairs[0].0, "NO. OF ITEMS FOUND");
        assert_eq!(pairs[0].1.trim(), "12");
        assert_eq!(pairs[1].1.trim(), "15");
        assert_eq!(pairs[9].1.trim(), ".00");
        assert_eq!(pairs[10].1.trim(), "1,234.56");
        assert!(!pairs[9].1.contains('*'));
    }

    #[test]
    fn lines_without_colon_are_dropped_from_summary() {
        let raw = sample_report().replace("NO. OF ITEMS ON LOAN:               0", "SEE FOOTNOTE");
        let blocks = segment_report(&raw, &ReportLayout::default()).unwrap();

        assert_eq!(blocks[0].summary_pairs.len(), 15);
    }

    #[test]
    fn missing_ruler_is_a_structural_error() {
        let raw = sample_report();
        let without_ruler = raw
            .split("\r\n")
            .filter(|line| *line != "----- ---")
            .collect::<Vec<&str>>()
            .join("\r\n");

        let err = segment_report(&without_ruler, &ReportLayout::default()).unwrap_err();
        assert!(format!("{err:#}").contains("no spacing ruler"));
    }

    #[test]
    fn missing_code_is_a_structural_error() {
        let raw = sample_report().replace(
            "2500 UNIT CODE: 0200-002    ANNUAL PHYSICAL INVENTORY",
            "2500 UNIT CODE: UNKNOWN     ANNUAL PHYSICAL INVENTORY",
        );

        let err = segment_report(&raw, &ReportLayout::default()).unwrap_err();
        assert!(format!("{err:#}").contains("no unit code"));
    }

    #[test]
    fn single_analysis_heading_is_a_structural_error() {
        let layout = ReportLayout::default();
        let raw = sample_report();
        let single_heading = raw
            .split("\r\n")
            .filter(|line| *line != layout.analysis_heading)
            .collect::<Vec<&str>>()
            .join("\r\n");

        let err = segment_report(&single_heading, &layout).unwrap_err();
        assert!(format!("{err:#}").contains("analysis heading"));
    }

    #[test]
    fn report_without_sentinels_yields_no_blocks() {
        let raw = "NVP1\r\nEMPTY RUN\r\n\r\n\r\nNOTHING HERE";
        let blocks = segment_report(raw, &ReportLayout::default()).unwrap();
        assert!(blocks.is_empty());
    }
}
