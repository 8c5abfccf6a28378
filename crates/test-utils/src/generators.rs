//! Synthetic native datasets shaped like the arrays' source files.
//!
//! Every value is predictable: component `k` at time step `i` holds
//! `base_k + 0.1 * i`, so tests can check values survive conversion exactly.

use ac1_common::{ArrayData, Dataset, Variable};

/// RAPID transport components in the order they are stacked.
pub const RAPID_COMPONENTS: [&str; 8] = [
    "t_gs10", "t_ek10", "t_umo10", "t_therm10", "t_aiw10", "t_ud10", "t_ld10", "t_bw10",
];

/// Depth levels of the RAPID streamfunction products.
pub const RAPID_DEPTHS: usize = 307;

/// Predictable series: `base + 0.1 * i`.
pub fn series(base: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| base + 0.1 * i as f64).collect()
}

fn time_coordinate(name: &str, units: &str, values: Vec<f64>) -> Variable {
    Variable::vector(name, ArrayData::Double(values))
        .with_attr("units", units)
        .with_attr("standard_name", "time")
        .with_attr("calendar", "gregorian")
}

fn transport(dim: &str, values: Vec<f64>, units: &str) -> Variable {
    Variable::vector(dim, ArrayData::Double(values)).with_attr("units", units)
}

/// RAPID `moc_transports.nc`: twelve-hourly component transports and the
/// MOC index from 2004-04-02T00:00Z, `n` time steps.
pub fn rapid_moc_transports(n: usize) -> Dataset {
    let mut ds = Dataset::new();
    ds.add_unlimited_dimension("time", n).unwrap();
    let hours = (0..n).map(|i| 24.0 + 12.0 * i as f64).collect();
    ds.add_coord("time", time_coordinate("time", "hours since 2004-04-01 00:00:00", hours))
        .unwrap();

    for (k, name) in RAPID_COMPONENTS.iter().enumerate() {
        ds.add_data_var(name, transport("time", series(k as f64 - 3.0, n), "Sv"))
            .unwrap();
    }
    ds.add_data_var("moc_mar_hc10", transport("time", series(17.0, n), "Sv"))
        .unwrap();
    // Not part of any mapping; must be dropped
    ds.add_data_var("t_ek_monthly", transport("time", series(0.5, n), "Sv"))
        .unwrap();
    ds.set_attr("creator_name", "RAPID processing team");
    ds
}

/// RAPID `moc_vertical.nc`: streamfunction stored as (depth, time) with
/// `depths` levels 20 m apart.
pub fn rapid_moc_vertical(n: usize, depths: usize) -> Dataset {
    let mut ds = Dataset::new();
    ds.add_dimension("depth", depths).unwrap();
    ds.add_unlimited_dimension("time", n).unwrap();

    let levels = (0..depths).map(|d| 20.0 * d as f64).collect();
    ds.add_coord(
        "depth",
        Variable::vector("depth", ArrayData::Double(levels)).with_attr("units", "m"),
    )
    .unwrap();
    let hours = (0..n).map(|i| 24.0 + 12.0 * i as f64).collect();
    ds.add_coord("time", time_coordinate("time", "hours since 2004-04-01 00:00:00", hours))
        .unwrap();

    // row d holds d + 0.001 * i
    let values = (0..depths)
        .flat_map(|d| (0..n).map(move |i| d as f64 + 0.001 * i as f64))
        .collect();
    let sf = Variable::new(
        "stream_function_mar",
        vec!["depth".into(), "time".into()],
        vec![depths, n],
        ArrayData::Double(values),
    )
    .unwrap()
    .with_attr("units", "Sv");
    ds.add_data_var("stream_function_mar", sf).unwrap();
    ds
}

/// Density levels of the RAPID meridional transports product.
pub const RAPID_SIGMA_LEVELS: usize = 631;

fn ten_day_time(ds: &mut Dataset, n: usize) {
    ds.add_unlimited_dimension("time", n).unwrap();
    let days = (0..n).map(|i| 1.0 + 10.0 * i as f64).collect();
    ds.add_coord("time", time_coordinate("time", "days since 2004-04-01", days))
        .unwrap();
}

/// Row-major values of a `rows x cols` field: `row + 0.001 * col`.
fn field(rows: usize, cols: usize) -> Vec<f64> {
    (0..rows)
        .flat_map(|r| (0..cols).map(move |c| r as f64 + 0.001 * c as f64))
        .collect()
}

/// RAPID `mocha_mht_data.nc`: ten-daily transports from 2004-04-02 with the
/// streamfunction in depth (`z`) and density (`sigma0`) space, both stored
/// with time last.
pub fn rapid_mocha_mht(n: usize) -> Dataset {
    let mut ds = Dataset::new();
    ten_day_time(&mut ds, n);
    ds.add_dimension("z", RAPID_DEPTHS).unwrap();
    ds.add_dimension("sigma0", RAPID_SIGMA_LEVELS).unwrap();

    let depths = (0..RAPID_DEPTHS).map(|d| 20.0 * d as f64).collect();
    ds.add_coord(
        "z",
        Variable::vector("z", ArrayData::Double(depths)).with_attr("units", "m"),
    )
    .unwrap();
    let densities = (0..RAPID_SIGMA_LEVELS).map(|k| 23.0 + 0.01 * k as f64).collect();
    ds.add_coord(
        "sigma0",
        Variable::vector("sigma0", ArrayData::Double(densities)).with_attr("units", "kg/m3"),
    )
    .unwrap();

    ds.add_data_var("moc", transport("time", series(17.5, n), "Sv")).unwrap();
    ds.add_data_var("moc_sigma", transport("time", series(19.0, n), "Sv")).unwrap();
    let watts = series(1.2, n).iter().map(|v| v * 1.0e15).collect();
    ds.add_data_var("Q_sum", transport("time", watts, "W")).unwrap();
    ds.add_data_var("fw_sum", transport("time", series(-1.1, n), "Sv")).unwrap();

    for (name, dim, levels) in [
        ("psi_z", "z", RAPID_DEPTHS),
        ("psi_sigma", "sigma0", RAPID_SIGMA_LEVELS),
    ] {
        let psi = Variable::new(
            name,
            vec![dim.into(), "time".into()],
            vec![levels, n],
            ArrayData::Double(field(levels, n)),
        )
        .unwrap()
        .with_attr("units", "Sv");
        ds.add_data_var(name, psi).unwrap();
    }
    ds
}

/// RAPID gridded hydrographic sections: ten-daily temperature and salinity
/// as (time, depth, lon) and velocity in cm/s stored as (depth, lon, time),
/// `lons` stations from 76.75W eastwards.
pub fn rapid_gridded_sections(n: usize, lons: usize) -> Dataset {
    let mut ds = Dataset::new();
    ten_day_time(&mut ds, n);
    ds.add_dimension("depth", RAPID_DEPTHS).unwrap();
    ds.add_dimension("lon", lons).unwrap();

    let depths = (0..RAPID_DEPTHS).map(|d| 20.0 * d as f64).collect();
    ds.add_coord(
        "depth",
        Variable::vector("depth", ArrayData::Double(depths)).with_attr("units", "m"),
    )
    .unwrap();
    let longitudes = (0..lons).map(|k| -76.75 + 0.5 * k as f64).collect();
    ds.add_coord(
        "lon",
        Variable::vector("lon", ArrayData::Double(longitudes)).with_attr("units", "degrees_east"),
    )
    .unwrap();

    let section = |name: &str, values: Vec<f64>, units: &str| {
        Variable::new(
            name,
            vec!["time".into(), "depth".into(), "lon".into()],
            vec![n, RAPID_DEPTHS, lons],
            ArrayData::Double(values),
        )
        .unwrap()
        .with_attr("units", units)
    };
    let temperature = time_depth_lon(n, lons, |t, d, k| {
        20.0 - 0.05 * d as f64 + 0.01 * k as f64 + 0.1 * t as f64
    });
    ds.add_data_var("TG", section("TG", temperature, "degC")).unwrap();
    let salinity = time_depth_lon(n, lons, |_, d, _| 35.0 + 0.001 * d as f64);
    ds.add_data_var("SG", section("SG", salinity, "psu")).unwrap();

    let mut velocity = Vec::with_capacity(n * RAPID_DEPTHS * lons);
    for d in 0..RAPID_DEPTHS {
        for k in 0..lons {
            for t in 0..n {
                velocity.push(velocity_cm_s(t, d, k));
            }
        }
    }
    let vg = Variable::new(
        "VG",
        vec!["depth".into(), "lon".into(), "time".into()],
        vec![RAPID_DEPTHS, lons, n],
        ArrayData::Double(velocity),
    )
    .unwrap()
    .with_attr("units", "cm/s");
    ds.add_data_var("VG", vg).unwrap();
    ds
}

/// Row-major (time, depth, lon) values of `f`.
fn time_depth_lon(n: usize, lons: usize, f: impl Fn(usize, usize, usize) -> f64) -> Vec<f64> {
    let mut values = Vec::with_capacity(n * RAPID_DEPTHS * lons);
    for t in 0..n {
        for d in 0..RAPID_DEPTHS {
            for k in 0..lons {
                values.push(f(t, d, k));
            }
        }
    }
    values
}

/// Native northward velocity in cm/s at (time, depth, lon) of
/// [`rapid_gridded_sections`].
pub fn velocity_cm_s(t: usize, d: usize, k: usize) -> f64 {
    5.0 - 0.01 * d as f64 + k as f64 + 0.5 * t as f64
}

/// OSNAP `OSNAP_MOC_MHT_MFT_TimeSeries.nc`: monthly section transports from
/// 2014-08-01. `with_freshwater` controls the optional MFT_ALL series.
pub fn osnap_transports(n: usize, with_freshwater: bool) -> Dataset {
    let mut ds = Dataset::new();
    ds.add_unlimited_dimension("TIME", n).unwrap();
    let days = (0..n).map(|i| 23588.0 + 30.0 * i as f64).collect();
    ds.add_coord("TIME", time_coordinate("TIME", "days since 1950-01-01", days))
        .unwrap();

    ds.add_data_var("MOC_ALL", transport("TIME", series(16.6, n), "Sv")).unwrap();
    ds.add_data_var("MOC_EAST", transport("TIME", series(16.8, n), "Sv")).unwrap();
    ds.add_data_var("MOC_WEST", transport("TIME", series(2.6, n), "Sv")).unwrap();
    ds.add_data_var("MHT_ALL", transport("TIME", series(0.45, n), "PW")).unwrap();
    if with_freshwater {
        ds.add_data_var("MFT_ALL", transport("TIME", series(-0.2, n), "Sv")).unwrap();
    }
    ds
}

/// MOVE `OS_MOVE_TRANSPORTS.nc`: daily NADW transport components from
/// 2000-01-01.
pub fn move_transports(n: usize) -> Dataset {
    let mut ds = Dataset::new();
    ds.add_unlimited_dimension("TIME", n).unwrap();
    let days = (0..n).map(|i| i as f64).collect();
    ds.add_coord("TIME", time_coordinate("TIME", "days since 2000-01-01", days))
        .unwrap();

    ds.add_data_var("TRANSPORT_INTERNAL", transport("TIME", series(-12.0, n), "Sverdrup"))
        .unwrap();
    ds.add_data_var("TRANSPORT_BOUNDARY", transport("TIME", series(-3.0, n), "Sverdrup"))
        .unwrap();
    ds.add_data_var("TRANSPORT_TOTAL", transport("TIME", series(-15.0, n), "Sverdrup"))
        .unwrap();
    ds
}

/// SAMBA daily MOC anomaly from 2009-03-19, already in epoch seconds.
pub fn samba_transports(n: usize) -> Dataset {
    let mut ds = Dataset::new();
    ds.add_unlimited_dimension("time", n).unwrap();
    let seconds = (0..n).map(|i| 1_237_420_800.0 + 86_400.0 * i as f64).collect();
    ds.add_coord(
        "time",
        time_coordinate("time", "seconds since 1970-01-01T00:00:00Z", seconds),
    )
    .unwrap();
    ds.add_data_var("MOC", transport("time", series(-1.5, n), "Sv")).unwrap();
    ds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rapid_transports_shape() {
        let ds = rapid_moc_transports(4);
        assert_eq!(ds.dimension("time").unwrap().size, 4);
        for name in RAPID_COMPONENTS {
            assert_eq!(ds.data_var(name).unwrap().len(), 4);
        }
    }

    #[test]
    fn test_vertical_layout() {
        let ds = rapid_moc_vertical(3, 5);
        let sf = ds.data_var("stream_function_mar").unwrap();
        assert_eq!(sf.shape(), &[5, 3]);
        // depth 1, time 2
        let value = sf.data().to_f64_vec().unwrap()[5];
        assert!((value - 1.002).abs() < 1e-12);
    }

    #[test]
    fn test_gridded_velocity_stored_time_last() {
        let ds = rapid_gridded_sections(2, 3);
        let vg = ds.data_var("VG").unwrap();
        assert_eq!(vg.shape(), &[RAPID_DEPTHS, 3, 2]);
        // depth 0, lon 1, time 1
        assert_eq!(vg.data().to_f64_vec().unwrap()[3], velocity_cm_s(1, 0, 1));
        assert_eq!(ds.data_var("TG").unwrap().shape(), &[2, RAPID_DEPTHS, 3]);
    }

    #[test]
    fn test_mocha_levels() {
        let ds = rapid_mocha_mht(2);
        assert_eq!(ds.dimension("sigma0").unwrap().size, RAPID_SIGMA_LEVELS);
        assert_eq!(ds.data_var("psi_sigma").unwrap().shape(), &[RAPID_SIGMA_LEVELS, 2]);
    }

    #[test]
    fn test_optional_freshwater() {
        assert!(osnap_transports(2, true).data_var("MFT_ALL").is_some());
        assert!(osnap_transports(2, false).data_var("MFT_ALL").is_none());
    }
}
