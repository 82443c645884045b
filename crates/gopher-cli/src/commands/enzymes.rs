use crate::cli::EnzymesArgs;
use crate::config;
use crate::error::Result;
use gopherpp::core::io::enzymes::EnzymeTable;

pub async fn run(args: EnzymesArgs) -> Result<()> {
    let table = config::enzyme_table(args.enzyme_table.as_deref())?;
    print!("{}", format_table(&table));
    Ok(())
}

fn format_table(table: &EnzymeTable) -> String {
    let width = table
        .enzymes()
        .iter()
        .map(|e| e.name().len())
        .max()
        .unwrap_or(0)
        .max("Name".len());

    let mut out = format!("{:<width$}  Site\n", "Name", width = width);
    for enzyme in table.enzymes() {
        out.push_str(&format!(
            "{:<width$}  {}\n",
            enzyme.name(),
            enzyme.site(),
            width = width
        ));
    }
    out
}
