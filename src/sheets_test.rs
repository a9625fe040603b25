#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::error::{Error, RequestError};
    use crate::formula_grid::FormulaGridBuilder;
    use rstest::rstest;
    use serde_json::json;

    fn class_data() -> Vec<Vec<Value>> {
        vec![
            vec![
                json!("Alexandra"),
                json!("Female"),
                json!("4. Senior"),
                json!("CA"),
                json!("English"),
                json!("Drama Club"),
            ],
            vec![
                json!("Andrew"),
                json!("Male"),
                json!("1. Freshman"),
                json!("SD"),
                json!("Math"),
            ],
            vec![json!("Anna"), json!("Female")],
        ]
    }

    #[test]
    fn test_select_columns_name_gender_major() {
        let selected = select_columns(&class_data(), &[0, 1, 4]);
        assert_eq!(
            selected,
            vec![
                vec!["Alexandra", "Female", "English"],
                vec!["Andrew", "Male", "Math"],
                vec!["Anna", "Female", ""],
            ]
        );
    }

    #[test]
    fn test_select_columns_empty() {
        assert!(select_columns(&[], &[0, 1, 4]).is_empty());
    }

    #[rstest]
    #[case(json!("text"), "text")]
    #[case(json!(42), "42")]
    #[case(json!(1.5), "1.5")]
    #[case(json!(true), "true")]
    #[case(json!(null), "")]
    fn test_cell_text(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(cell_text(&value), expected);
    }

    #[rstest]
    #[case(ValueInputOption::Raw, "RAW")]
    #[case(ValueInputOption::UserEntered, "USER_ENTERED")]
    fn test_value_input_option(#[case] option: ValueInputOption, #[case] expected: &str) {
        assert_eq!(option.as_str(), expected);
    }

    #[test]
    fn test_values_get_param() {
        let params = ValuesGetParam::new("sheet-id", "Class Data!A2:E");
        assert_eq!(params.spreadsheet_id, "sheet-id");
        assert_eq!(params.range, "Class Data!A2:E");
    }

    #[tokio::test]
    async fn test_read_columns() {
        let mut client = MockSpreadsheetClient::new();
        client
            .expect_read()
            .withf(|id, range| id == "sample" && range == "Class Data!A2:E")
            .times(1)
            .returning(|_, _| Ok(class_data()));

        let rows = read_columns(&client, "sample", "Class Data!A2:E", &[0, 1, 4])
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["Andrew", "Male", "Math"]);
    }

    #[tokio::test]
    async fn test_write_grid_sends_user_entered_values() {
        let grid = FormulaGridBuilder::new().build().unwrap();
        let expected = grid.to_values();

        let mut client = MockSpreadsheetClient::new();
        client
            .expect_write()
            .withf(move |id, range, input, rows| {
                id == "target"
                    && range == "Example!A1"
                    && *input == ValueInputOption::UserEntered
                    && *rows == expected
            })
            .times(1)
            .returning(|_, _, _, _| Ok(37));

        let updated = write_grid(
            &client,
            "target",
            "Example!A1",
            ValueInputOption::UserEntered,
            &grid,
        )
        .await
        .unwrap();
        assert_eq!(updated, 37);
    }

    #[tokio::test]
    async fn test_write_grid_raw_keeps_formula_text() {
        let grid = FormulaGridBuilder::new()
            .recurrence_columns(1)
            .recurrence_rows(0)
            .build()
            .unwrap();

        let mut client = MockSpreadsheetClient::new();
        client
            .expect_write()
            .withf(|_, _, input, rows| {
                *input == ValueInputOption::Raw && rows[3][2] == json!("=A4+B4")
            })
            .times(1)
            .returning(|_, _, _, rows| Ok(rows.iter().map(Vec::len).sum::<usize>() as u32));

        let updated = write_grid(&client, "target", "Example!A1", ValueInputOption::Raw, &grid)
            .await
            .unwrap();
        assert_eq!(updated, 1 + 2 + 4 + 3 + 1);
    }

    #[tokio::test]
    async fn test_write_grid_propagates_failure() {
        let grid = FormulaGridBuilder::new().build().unwrap();
        let mut client = MockSpreadsheetClient::new();
        client.expect_write().times(1).returning(|_, _, _, _| {
            Err(Error::Request(RequestError::Forbidden {
                code: 403,
                message: "The caller does not have permission".to_string(),
            }))
        });

        let err = write_grid(
            &client,
            "target",
            "Example!A1",
            ValueInputOption::UserEntered,
            &grid,
        )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Request(RequestError::Forbidden { code: 403, .. })
        ));
    }
}
