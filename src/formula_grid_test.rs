#[cfg(test)]
mod tests {
    use super::super::*;
    use rstest::rstest;
    use serde_json::json;

    fn formula(s: &str) -> CellValue {
        CellValue::Formula(s.to_string())
    }

    fn default_grid() -> FormulaGrid {
        FormulaGridBuilder::new().build().unwrap()
    }

    #[test]
    fn test_build_is_deterministic() {
        assert_eq!(default_grid(), default_grid());
    }

    #[test]
    fn test_base_rows() {
        let grid = default_grid();
        let rows = grid.rows();
        assert_eq!(rows[0], vec![CellValue::text("DMann")]);
        assert_eq!(
            rows[1],
            vec![CellValue::text("Fibonacci"), CellValue::text("Sequence")]
        );
        assert_eq!(rows[2].len(), 4);
        assert_eq!(rows[2][3], CellValue::text("Columns & Rows"));
        assert_eq!(rows[4], vec![CellValue::Number(1)]);
    }

    #[test]
    fn test_seed_row_extends_across_alphabet() {
        let grid = default_grid();
        let row = &grid.rows()[3];
        assert_eq!(row.len(), 14);
        assert_eq!(row[0], CellValue::Number(0));
        assert_eq!(row[1], CellValue::Number(1));
        assert_eq!(row[2], formula("=A4+B4"));
        assert_eq!(row[3], formula("=B4+C4"));
        assert_eq!(row[13], formula("=L4+M4"));
        assert!(row[2..].iter().all(CellValue::is_formula));
    }

    #[test]
    fn test_appended_rows() {
        let grid = default_grid();
        assert_eq!(grid.row_count(), 20);
        let appended = &grid.rows()[5..];
        assert_eq!(appended.len(), 15);
        assert!(appended.iter().all(|row| row.len() == 1));
        assert_eq!(appended[0][0], formula("=A4+A5"));
        assert_eq!(appended[14][0], formula("=A18+A19"));
    }

    #[rstest]
    #[case(0, "=A4+A5")]
    #[case(1, "=A5+A6")]
    #[case(7, "=A11+A12")]
    #[case(14, "=A18+A19")]
    fn test_appended_row_formula(#[case] j: usize, #[case] expected: &str) {
        assert_eq!(default_grid().rows()[5 + j][0], formula(expected));
    }

    #[test]
    fn test_every_reference_is_inside_grid() {
        let grid = default_grid();
        let mut checked = 0;
        for row in grid.rows() {
            for cell in row.iter().filter(|c| c.is_formula()) {
                let refs = cell.references();
                assert_eq!(refs.len(), 2, "{}", cell);
                for address in refs {
                    assert!(grid.contains(&address), "{} is outside the grid", address);
                    checked += 1;
                }
            }
        }
        assert_eq!(checked, 2 * (12 + 15));
    }

    #[test]
    fn test_alphabet_exhaustion_fails_fast() {
        let err = FormulaGridBuilder::new()
            .recurrence_columns(ALPHABET.len())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RangeError::AlphabetExhausted {
                index: 13,
                available: 13
            }
        );
    }

    #[test]
    fn test_smaller_layout() {
        let grid = FormulaGridBuilder::new()
            .recurrence_columns(2)
            .recurrence_rows(1)
            .build()
            .unwrap();
        assert_eq!(grid.rows()[3].len(), 4);
        assert_eq!(grid.rows()[3][3], formula("=B4+C4"));
        assert_eq!(grid.row_count(), 6);
    }

    #[test]
    fn test_to_values() {
        let values = default_grid().to_values();
        assert_eq!(values[0], vec![json!("DMann")]);
        assert_eq!(values[3][0], json!(0));
        assert_eq!(values[3][2], json!("=A4+B4"));
        assert_eq!(values[19], vec![json!("=A18+A19")]);
    }

    #[test]
    fn test_serialize_untagged() {
        let json = serde_json::to_value(default_grid()).unwrap();
        assert_eq!(json[3][1], json!(1));
        assert_eq!(json[5][0], json!("=A4+A5"));
    }

    #[rstest]
    #[case("A4", 'A', 4)]
    #[case("M19", 'M', 19)]
    fn test_parse_address(#[case] s: &str, #[case] column: char, #[case] row: usize) {
        let address: CellAddress = s.parse().unwrap();
        assert_eq!(address, CellAddress { column, row });
        assert_eq!(address.to_string(), s);
    }

    #[rstest]
    #[case("N4")]
    #[case("A0")]
    #[case("A")]
    #[case("4A")]
    #[case("")]
    fn test_parse_invalid_address(#[case] s: &str) {
        assert!(s.parse::<CellAddress>().is_err());
    }

    #[test]
    fn test_cell_lookup() {
        let grid = default_grid();
        let a1: CellAddress = "A1".parse().unwrap();
        assert_eq!(grid.cell(&a1), Some(&CellValue::text("DMann")));
        let b1: CellAddress = "B1".parse().unwrap();
        assert!(!grid.contains(&b1));
        let a21: CellAddress = "A21".parse().unwrap();
        assert!(!grid.contains(&a21));
    }

    #[rstest]
    #[case('@')]
    #[case('a')]
    #[case('N')]
    #[case('Ā')]
    fn test_cell_lookup_outside_alphabet(#[case] column: char) {
        let grid = default_grid();
        let address = CellAddress { column, row: 1 };
        assert_eq!(address.column_index(), None);
        assert_eq!(grid.cell(&address), None);
        assert!(!grid.contains(&address));
    }

    #[test]
    fn test_column_index() {
        assert_eq!(CellAddress { column: 'A', row: 4 }.column_index(), Some(0));
        assert_eq!(CellAddress { column: 'M', row: 4 }.column_index(), Some(12));
    }
}
