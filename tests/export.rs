use std::io::Cursor;

use lammps_utils::export::table::{TableFormat, write_csv, write_table};
use lammps_utils::export::vtp::{point_cloud_from_table, write_vtp, write_vtp_to};
use lammps_utils::{GenericLoader, TimestepRange, read_dump};

const DUMP: &str = "\
ITEM: TIMESTEP
10
ITEM: NUMBER OF ATOMS
2
ITEM: BOX BOUNDS pp pp pp
0 1
0 1
0 1
ITEM: ATOMS id type x y z diameter
2 1 0.5 0.25 0.75 1.5
1 2 0.1 0.2 0.3 1
";

#[test]
fn dump_to_point_cloud() {
    let records = read_dump(Cursor::new(DUMP), &GenericLoader, TimestepRange::all()).unwrap();
    let (positions, attributes) = point_cloud_from_table(&records[0].particles).unwrap();

    let mut buf = Vec::new();
    write_vtp_to(&mut buf, &positions, &attributes).unwrap();
    let xml = String::from_utf8(buf).unwrap();

    assert!(xml.contains(r#"NumberOfPoints="2""#));
    assert!(xml.contains(r#"type="Int32" Name="id""#));
    assert!(xml.contains(r#"type="Float64" Name="type""#));
    assert!(xml.contains(r#"type="Float64" Name="diameter""#));
    assert!(xml.contains("          0.5 0.25 0.75 0.1 0.2 0.3\n"));
}

#[test]
fn dump_to_files() {
    let records = read_dump(Cursor::new(DUMP), &GenericLoader, TimestepRange::all()).unwrap();
    let table = &records[0].particles;
    let dir = std::env::temp_dir().join(format!("lammps_utils_export_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let (positions, attributes) = point_cloud_from_table(table).unwrap();
    let vtp = dir.join("out.vtp");
    write_vtp(&vtp, &positions, &attributes).unwrap();
    assert!(std::fs::read_to_string(&vtp).unwrap().starts_with("<?xml"));

    let csv_path = dir.join("out.csv");
    write_table(&csv_path, table, TableFormat::Csv).unwrap();
    let mut expected = Vec::new();
    write_csv(&mut expected, table).unwrap();
    assert_eq!(std::fs::read(&csv_path).unwrap(), expected);

    let pq = dir.join("out.parquet");
    write_table(&pq, table, TableFormat::Parquet).unwrap();
    assert!(std::fs::read(&pq).unwrap().starts_with(b"PAR1"));

    std::fs::remove_dir_all(&dir).ok();
}
