use crate::utils::csv::CsvGrid;

#[test]
fn test_parse_basic_grid() {
    let grid = CsvGrid::parse("a,b,c\n1,2,3\n4,5,6", ',', '\n').expect("should parse");

    assert_eq!(grid.row_count(), 3);
    assert_eq!(grid.column_count(), 3);
    assert_eq!(grid.get(0, 0), Some("a"));
    assert_eq!(grid.get(2, 1), Some("5"));
}

#[test]
fn test_parse_trims_cells_and_skips_empty_lines() {
    let grid = CsvGrid::parse(" a , b \n\n 1 ,2 \n", ',', '\n').expect("should parse");

    assert_eq!(grid.row_count(), 2);
    assert_eq!(grid.get(0, 0), Some("a"));
    assert_eq!(grid.get(1, 1), Some("2"));
}

#[test]
fn test_parse_rejects_ragged_rows() {
    assert!(CsvGrid::parse("a,b\n1,2,3", ',', '\n').is_err());
}

#[test]
fn test_parse_empty_input() {
    let grid = CsvGrid::parse("", ',', '\n').expect("should parse");
    assert!(grid.is_empty());
    assert_eq!(grid.column_count(), 0);
}
