use itertools::Itertools;
use kh_cube::{Diagram, Edge, KhConfig};

use super::err;

pub fn measure<F, Res>(proc: F) -> (Res, std::time::Duration)
where F: FnOnce() -> Res {
    let start = std::time::Instant::now();
    let res = proc();
    let time = start.elapsed();
    (res, time)
}

pub fn guard_panic<F, R>(f: F) -> Result<R, Box<dyn std::error::Error>>
where F: FnOnce() -> Result<R, Box<dyn std::error::Error>> + std::panic::UnwindSafe {
    std::panic::catch_unwind(|| {
        f()
    }).unwrap_or_else(|e| {
        let info = match e.downcast::<String>() { 
            Ok(v) => *v,
            Err(e) => match e.downcast::<&str>() { 
                Ok(v) => v.to_string(),
                _ => "Unknown Source of Error".to_owned()
            }
        };
        err!("panic: {info}")
    })
}

/// Reads a diagram from a JSON PD code `[[1,4,2,5],...]`, a
/// `PD[X[1,4,2,5], ...]` string or a table name.
pub fn load_diagram(input: &String) -> Result<Diagram, Box<dyn std::error::Error>> {
    type PDCode = Vec<[Edge; 4]>;

    if let Ok(pd_code) = serde_json::from_str::<PDCode>(input) { 
        return Ok(Diagram::from_pd_code(pd_code)?)
    }

    if input.trim_start().starts_with("PD[") {
        let r = regex::Regex::new(r"X\[\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\]")?;
        let pd_code = r.captures_iter(input).map(|m| {
            let e = (1..=4).map(|k| m[k].parse::<Edge>()).collect::<Result<Vec<_>, _>>()?;
            Ok([e[0], e[1], e[2], e[3]])
        }).collect::<Result<PDCode, std::num::ParseIntError>>()?;

        return Ok(Diagram::from_pd_code(pd_code)?)
    }

    if let Ok(d) = Diagram::load(input) { 
        return Ok(d)
    }

    err!("invalid input diagram: '{}'", input)
}

pub fn load_config(path: Option<&String>) -> Result<KhConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else { 
        return Ok(KhConfig::default())
    };
    let text = std::fs::read_to_string(path)?;
    let config: KhConfig = serde_json::from_str(&text)?;
    Ok(config)
}

pub fn csv_writer(path: &String) -> Result<csv::Writer<std::fs::File>, Box<dyn std::error::Error>> {
    use std::fs::OpenOptions;

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;

    let wtr = csv::Writer::from_writer(file);

    Ok(wtr)
}

pub fn join_tors<I, T>(tors: I) -> String
where I: IntoIterator<Item = T>, T: std::fmt::Display {
    tors.into_iter().join(";")
}
