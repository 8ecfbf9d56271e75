use jv_eos::{
    EosError, EosQuery, HeavyElementEos, IceRockBlend, Material, MixtureEos, PureMaterial,
    TabulatedHHe, resolve_data_dir,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Writes a small EOS data directory with ideal-gas-like tables.
fn write_data_dir(tag: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("jv-eos-{tag}-{}", std::process::id()));
    fs::create_dir_all(root.join("hhe")).unwrap();
    fs::create_dir_all(root.join("z")).unwrap();

    let table = |logmu: f64, stiff: f64| {
        let mut out = String::from("# logrho logt logp logu logs\n");
        for ip in 0..9 {
            for it in 0..6 {
                let logp = 5.0 + ip as f64;
                let logt = 2.0 + 0.5 * it as f64;
                let logrho = stiff * logp - (1.0 - stiff) * logt + logmu - 8.0 * stiff;
                let logs = 0.5 * logt - 0.2 * logp;
                out.push_str(&format!("{logrho} {logt} {logp} 10.0 {logs}\n"));
            }
        }
        out
    };
    fs::write(root.join("hhe/h_pt.dat"), table(0.0, 1.0)).unwrap();
    fs::write(root.join("hhe/he_pt.dat"), table(0.6, 1.0)).unwrap();
    fs::write(root.join("z/ice_pt.dat"), table(1.0, 0.3)).unwrap();
    fs::write(root.join("z/serpentine_pt.dat"), table(1.4, 0.3)).unwrap();
    root
}

#[test]
fn full_mixture_from_files() {
    let dir = write_data_dir("mix");
    let dir = resolve_data_dir(Some(dir.as_path())).unwrap();
    let hhe = TabulatedHHe::load(&dir).unwrap();
    let blend = IceRockBlend::load(&dir, 0.5, false).unwrap();
    let eos = MixtureEos::new(Arc::new(hhe), Arc::new(blend));

    let logp = [6.0, 8.5, 11.0];
    let logt = [2.2, 3.0, 4.1];
    let out = eos
        .evaluate(&EosQuery {
            logp: &logp,
            logt: &logt,
            y_xy: &[0.27; 3],
            z: &[0.0, 0.1, 0.5],
        })
        .unwrap();
    assert_eq!(out.rho.len(), 3);
    assert!(out.rho.iter().all(|&r| r > 0.0));
    assert!(out.grada.iter().all(|&g| (g - 0.4).abs() < 1e-10));
    assert!(out.rho_z[0].is_none());
    assert!(out.rho_z[2].is_some());

    fs::remove_dir_all(dir).ok();
}

#[test]
fn lookups_are_bit_identical() {
    let dir = write_data_dir("idem");
    let eos = MixtureEos::new(
        Arc::new(TabulatedHHe::load(&dir).unwrap()),
        Arc::new(PureMaterial::load(&dir, Material::Ice, false).unwrap()),
    );
    let query = EosQuery {
        logp: &[7.77, 12.01],
        logt: &[2.9, 4.3],
        y_xy: &[0.3, 0.25],
        z: &[0.05, 0.9],
    };
    let a = eos.evaluate(&query).unwrap();
    let b = eos.evaluate(&query).unwrap();
    for i in 0..2 {
        assert_eq!(a.rho[i].to_bits(), b.rho[i].to_bits());
        assert_eq!(a.grada[i].to_bits(), b.grada[i].to_bits());
    }
    fs::remove_dir_all(dir).ok();
}

#[test]
fn below_table_pressure_is_out_of_range() {
    let dir = write_data_dir("range");
    let ice = PureMaterial::load(&dir, Material::Ice, false).unwrap();
    let err = ice.logrho(4.0, 3.0).unwrap_err();
    assert!(matches!(err, EosError::OutOfRange { what: "logp", .. }));
    fs::remove_dir_all(dir).ok();
}

#[test]
fn extended_tables_are_separate_files() {
    let dir = write_data_dir("hip");
    // Only the regular tables were written.
    let err = PureMaterial::load(&dir, Material::Serpentine, true).unwrap_err();
    assert!(matches!(err, EosError::Initialization { .. }));
    fs::remove_dir_all(dir).ok();
}
