use crate::common::{render, OutputFormat, TableView};
use anyhow::{anyhow, Result};
use clap::Args;
use serde::Serialize;
use sheetgrid::auth::{Credential, InstalledFlowProvider};
use sheetgrid::config::Settings;
use sheetgrid::credential_cache::CredentialCache;
use sheetgrid::formula_grid::{FormulaGrid, FormulaGridBuilder};
use sheetgrid::sheets::{self, SpreadSheet, ValueInputOption};

/// Name, Gender and Major in the sample `Class Data` sheet.
const CLASS_DATA_COLUMNS: [usize; 3] = [0, 1, 4];

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Spreadsheet ID to read
    #[clap(short = 's', long = "spreadsheet")]
    spreadsheet: Option<String>,

    /// A1 range to read
    #[clap(short = 'r', long = "range")]
    range: Option<String>,

    /// Output format
    #[clap(short = 'f', long = "format", value_enum, default_value = "stdout")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct GridArgs {
    /// Output format
    #[clap(short = 'f', long = "format", value_enum, default_value = "stdout")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct WriteArgs {
    /// Spreadsheet ID to write the grid to
    #[clap(short = 's', long = "spreadsheet")]
    spreadsheet: Option<String>,

    /// A1 range the grid is anchored at
    #[clap(short = 'r', long = "range")]
    range: Option<String>,

    /// Store formulas as literal text instead of letting the sheet evaluate them
    #[clap(long = "raw")]
    raw: bool,
}

#[derive(Serialize, Clone, Debug)]
pub struct Student {
    name: String,
    gender: String,
    major: String,
}

impl From<Vec<String>> for Student {
    fn from(row: Vec<String>) -> Self {
        let mut cells = row.into_iter();
        Student {
            name: cells.next().unwrap_or_default(),
            gender: cells.next().unwrap_or_default(),
            major: cells.next().unwrap_or_default(),
        }
    }
}

impl TableView for Student {
    fn columns(&self) -> Vec<String> {
        vec!["Name".to_string(), "Gender".to_string(), "Major".to_string()]
    }

    fn values(&self) -> Vec<String> {
        vec![self.name.clone(), self.gender.clone(), self.major.clone()]
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct GridRow {
    row: usize,
    cells: Vec<String>,
}

impl TableView for GridRow {
    fn columns(&self) -> Vec<String> {
        let mut columns = vec!["row".to_string()];
        columns.extend((0..self.cells.len()).map(|i| ((b'A' + i as u8) as char).to_string()));
        columns
    }

    fn values(&self) -> Vec<String> {
        let mut values = vec![self.row.to_string()];
        values.extend(self.cells.iter().cloned());
        values
    }
}

/// Rows padded to the widest row so every record has the same column count.
fn grid_rows(grid: &FormulaGrid) -> Vec<GridRow> {
    let width = grid.rows().iter().map(Vec::len).max().unwrap_or(0);
    grid.rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            cells.resize(width, String::new());
            GridRow { row: i + 1, cells }
        })
        .collect()
}

fn value_input(args: &WriteArgs) -> ValueInputOption {
    if args.raw {
        ValueInputOption::Raw
    } else {
        ValueInputOption::UserEntered
    }
}

async fn authorize(settings: &Settings) -> Result<Credential> {
    let cache = CredentialCache::new(&settings.token_path, &settings.client_secrets_path);
    let credential = cache
        .authorize(&InstalledFlowProvider, &settings.scopes)
        .await?;
    Ok(credential)
}

pub async fn handle_auth(settings: &Settings) -> Result<()> {
    let credential = authorize(settings).await?;
    if credential.is_persistable() {
        println!("Authorized. Credential cached at {:?}", settings.token_path);
    } else {
        println!("Authorized for this run only; no refresh token was issued.");
    }
    Ok(())
}

pub async fn handle_list(settings: &Settings, args: ListArgs) -> Result<()> {
    let spreadsheet_id = args
        .spreadsheet
        .unwrap_or_else(|| settings.read_spreadsheet_id.clone());
    let range = args.range.unwrap_or_else(|| settings.read_range.clone());

    let credential = authorize(settings).await?;
    let client = SpreadSheet::new(&credential).await?;
    let rows = sheets::read_columns(&client, &spreadsheet_id, &range, &CLASS_DATA_COLUMNS).await?;
    if rows.is_empty() {
        println!("No data found.");
        return Ok(());
    }
    let students: Vec<Student> = rows.into_iter().map(Student::from).collect();
    render(&students, args.format)
}

pub fn handle_grid(args: GridArgs) -> Result<()> {
    let grid = FormulaGridBuilder::new().build()?;
    render(&grid_rows(&grid), args.format)
}

pub async fn handle_write(settings: &Settings, args: WriteArgs) -> Result<()> {
    let input = value_input(&args);
    let spreadsheet_id = args
        .spreadsheet
        .or_else(|| settings.write_spreadsheet_id.clone())
        .ok_or_else(|| {
            anyhow!("no spreadsheet to write to: pass --spreadsheet or set SHEETGRID_WRITE_SPREADSHEET_ID")
        })?;
    let range = args.range.unwrap_or_else(|| settings.write_range.clone());

    let grid = FormulaGridBuilder::new().build()?;
    let credential = authorize(settings).await?;
    let client = SpreadSheet::new(&credential).await?;
    let updated = sheets::write_grid(&client, &spreadsheet_id, &range, input, &grid).await?;
    println!("{} cells updated.", updated);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_from_short_row() {
        let student = Student::from(vec!["Anna".to_string(), "Female".to_string()]);
        assert_eq!(student.values(), vec!["Anna", "Female", ""]);
        assert_eq!(student.columns(), vec!["Name", "Gender", "Major"]);
    }

    #[test]
    fn test_grid_rows_are_padded() {
        let grid = FormulaGridBuilder::new().build().unwrap();
        let rows = grid_rows(&grid);
        assert_eq!(rows.len(), 20);
        assert!(rows.iter().all(|r| r.cells.len() == 14));
        assert_eq!(rows[0].values()[..2], ["1".to_string(), "DMann".to_string()]);
        assert_eq!(rows[3].cells[13], "=L4+M4");
        assert_eq!(rows[19].values()[1], "=A18+A19");
        assert_eq!(rows[0].columns().last().map(String::as_str), Some("N"));
    }

    #[test]
    fn test_write_value_input() {
        let mut args = WriteArgs {
            spreadsheet: None,
            range: None,
            raw: false,
        };
        assert_eq!(value_input(&args), ValueInputOption::UserEntered);
        args.raw = true;
        assert_eq!(value_input(&args), ValueInputOption::Raw);
    }
}
