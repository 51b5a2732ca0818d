use tabled::{
    Table, Tabled,
    settings::{Panel, Remove, Style, object::Rows},
};

pub struct Formatter;

#[derive(Debug, Clone, Default)]
pub struct FormatConfig {
    pub header: Option<String>,
    /// Drop the column-name row.
    pub no_col_name: bool,
}

impl Formatter {
    pub fn table<T: Tabled>(data: impl IntoIterator<Item = T>, config: FormatConfig) -> Table {
        let mut table = Table::new(data);
        if config.no_col_name {
            table.with(Remove::row(Rows::first()));
        }
        if let Some(header) = config.header {
            table.with(Panel::header(header));
        }

        table.with(Style::blank());
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Tabled)]
    struct Row {
        name: &'static str,
        size: u32,
    }

    #[test]
    fn test_table_header_and_rows() {
        let rows = [Row { name: "a.zip", size: 3 }, Row { name: "b.7z", size: 10 }];
        let rendered = Formatter::table(
            rows,
            FormatConfig {
                header: Some("archives".to_string()),
                ..Default::default()
            },
        )
        .to_string();
        assert!(rendered.contains("archives"));
        assert!(rendered.contains("name"));
        assert!(rendered.contains("b.7z"));
    }

    #[test]
    fn test_table_without_column_names() {
        let rows = [Row { name: "a.zip", size: 3 }];
        let rendered = Formatter::table(
            rows,
            FormatConfig {
                no_col_name: true,
                ..Default::default()
            },
        )
        .to_string();
        assert!(!rendered.contains("size"));
        assert!(rendered.contains("a.zip"));
    }
}
