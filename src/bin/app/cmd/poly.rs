use kh_cube::{check_conjecture1, check_thin, check_torsion_conjecture, homological_width, rational_poly, torsion_poly, DiagramStore, HomologyType};
use crate::utils::*;

#[derive(Clone, Default, Debug, clap::Args)]
pub struct Args {
    pub link: String,

    #[arg(short = 't', long)]
    pub h_type: Option<HType>,

    #[arg(long)]
    pub config: Option<String>,

    #[arg(long)]
    pub split: bool,

    #[arg(long)]
    pub vector: bool,

    #[arg(long, default_value = "0")]
    pub log: u8,
}

pub fn dispatch(args: &Args) -> Result<String, Box<dyn std::error::Error>> { 
    let mut config = load_config(args.config.as_ref())?;
    if let Some(t) = args.h_type { 
        config.homology_type = t.into();
    }

    let d = load_diagram(&args.link)?;
    let mut store = DiagramStore::new(config)?;
    let slot = store.initialize_diagram(d, args.link.as_str(), None)?;

    let p = store.compute_polynomial(slot, args.split, args.vector)?;
    let h = store.homology(slot)?;
    let (kh, tors) = (rational_poly(&h), torsion_poly(&h));

    let mut b = string_builder::Builder::new(1024);

    b.append(format!("{} ({})\n", args.link, h.homology_type()));
    b.append(format!("Kh: {p}\n"));

    // the conjecture concerns unreduced even homology.
    if h.homology_type() == HomologyType::Standard { 
        let factor = store.linking_factor(slot)?;
        match check_conjecture1(&kh, &factor) { 
            Ok(c) => {
                b.append(format!("s: {}\n", c.s));
                b.append(format!("Kh': {}\n", c.remainder));

                match check_thin(&c.remainder) { 
                    Ok(Some(delta)) => b.append(format!("thin: j - 2i = {delta}\n")),
                    Ok(None)        => b.append("thin: Kh' = 0\n"),
                    Err(e)          => b.append(format!("{e}\n")),
                }
                match check_torsion_conjecture(&tors, &c.remainder) {
                    Ok(()) => b.append("torsion: T t q^2 Kh'\n"),
                    Err(e) => b.append(format!("{e}\n")),
                }
            },
            Err(e) => b.append(format!("{e}\n")),
        }
    }

    match homological_width(&kh) { 
        Some(w) => b.append(format!("width: {} (δ: {}..={})", w.width, w.min, w.max)),
        None    => b.append("width: -"),
    }

    let res = b.string()?;
    Ok(res)
}
