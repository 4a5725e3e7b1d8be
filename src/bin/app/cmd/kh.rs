use kh_cube::{DiagramStore, KhHomology};
use crate::utils::*;

#[derive(Clone, Default, Debug, clap::Args)]
pub struct Args {
    pub link: String,

    #[arg(short = 't', long)]
    pub h_type: Option<HType>,

    #[arg(long)]
    pub config: Option<String>,

    #[arg(long)]
    pub csv: Option<String>,

    #[arg(long)]
    pub debug: bool,

    #[arg(long, default_value = "0")]
    pub log: u8,
}

pub fn dispatch(args: &Args) -> Result<String, Box<dyn std::error::Error>> {
    let mut config = load_config(args.config.as_ref())?;
    if let Some(t) = args.h_type { 
        config.homology_type = t.into();
    }
    config.debug |= args.debug;

    let d = load_diagram(&args.link)?;
    let mut store = DiagramStore::new(config)?;
    let slot = store.initialize_diagram(d, args.link.as_str(), None)?;
    let h = store.homology(slot)?;

    if let Some(path) = &args.csv { 
        write_csv(&h, path)?;
    }

    let mut b = string_builder::Builder::new(1024);

    b.append(format!("{} ({})\n", args.link, h.homology_type()));
    b.append(h.display_table());

    let res = b.string()?;
    Ok(res)
}

fn write_csv(h: &KhHomology, path: &String) -> Result<(), Box<dyn std::error::Error>> { 
    let mut wtr = csv_writer(path)?;

    wtr.write_record(["i", "j", "rank", "torsion"])?;
    for (idx, s) in h.nonzero() {
        wtr.write_record([
            idx.0.to_string(),
            idx.1.to_string(),
            s.rank().to_string(),
            join_tors(s.tors()),
        ])?;
    }
    wtr.flush()?;

    Ok(())
}
