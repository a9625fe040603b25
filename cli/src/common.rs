use anyhow::Result;
use clap::ValueEnum;
use csv::Writer;
use serde::Serialize;
use std::{io, io::Write};
use tabled::{builder::Builder, settings::Style};

pub trait TableView {
    fn columns(&self) -> Vec<String>;
    fn values(&self) -> Vec<String>;
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
    #[default]
    Stdout,
}

pub fn render<T: TableView + Serialize>(data: &[T], output: OutputFormat) -> Result<()> {
    let mut writer = io::BufWriter::new(io::stdout());
    match output {
        OutputFormat::Json => {
            writer.write_all(serde_json::to_string(&data)?.as_bytes())?;
            writer.write_all("\n".as_bytes())?;
        }
        OutputFormat::Csv => {
            let mut csv_writer = Writer::from_writer(writer);
            let mut first = true;
            for d in data {
                if first {
                    csv_writer.write_record(d.columns())?;
                    first = false;
                }
                csv_writer.write_record(d.values())?;
            }
            csv_writer.flush()?;
            return Ok(());
        }
        OutputFormat::Stdout => {
            let mut builder = Builder::default();
            let header = if let Some(first) = data.first() {
                first.columns()
            } else {
                vec![]
            };
            builder.set_header(header);
            for row in data {
                builder.push_record(row.values());
            }

            let mut table = builder.build();
            table.with(Style::markdown());

            writer.write_all(table.to_string().as_bytes())?;
            writer.write_all("\n".as_bytes())?;
        }
    }
    writer.flush()?;
    Ok(())
}
