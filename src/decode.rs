/// Slices one raw item line into cells using a unit's spacing ruler,
/// consuming one separator character between adjacent columns. Cells come
/// back untrimmed; a short line truncates its trailing cells instead of
/// failing, so the cell count always equals the ruler length.
pub fn decode_item_line(line: &str, ruler: &[usize]) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut cells = Vec::with_capacity(ruler.len());
    let mut cursor = 0_usize;

    for &width in ruler {
        let start = cursor.min(chars.len());
        let end = (cursor + width).min(chars.len());
        cells.push(chars[start..end].iter().collect());
        cursor += width + 1;
    }

    cells
}
