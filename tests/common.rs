use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub const REPORT_HEADER: &str = "Date,UTC,Temp C,Humidity %,Pressure hPa,Visibility M,Wind Dir,Wind Spd KT,Lowest Cloud Base FT,Sky Conditions,Present Weather,METAR";

/// Seven rows: five valid (out of order), one garbled time, one bad date
#[allow(dead_code)]
pub const REPORT_ROWS: &str = "\
2024-01-05,0600,30,55,1008,9999,180,12KT gusting,2000,FEW020,HZ,OYAA 050600Z 18012KT 9999 FEW020 30/20 Q1008
2024-01-05,garbled,31,50,1007,9999,190,10,2000,FEW020,HZ,OYAA 050900Z 19010KT 9999 FEW020 31/19 Q1007
2024-01-05,1200,33,40,1006,8000,200,15,,SCT025,,OYAA 051200Z 20015KT 8000 SCT025 33/18 Q1006
2024-01-06,0000,26,70,1009,9999,0,0,,,,OYAA 060000Z 00000KT 9999 NSC 26/20 Q1009
2024-01-06,0600,28,0,1010,9999,VRB,5,,FEW020,HZ,OYAA 060600Z VRB05KT 9999 FEW020 28/// Q1010
2024-01-04,1800,27,60,1008,7000,160,8,1500,FEW020,BR,OYAA 041800Z 16008KT 7000 BR FEW015 27/19 Q1008
2024-13-01,0600,29,50,1008,9999,180,10,,,,OYAA 130600Z
";

/// Write `contents` to `name` inside a fresh temp dir
///
/// The dir must be kept alive for as long as the file is used.
#[allow(dead_code)]
pub fn write_fixture(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write fixture");
    (dir, path)
}

/// The standard report fixture as a CSV file
#[allow(dead_code)]
pub fn report_csv() -> (TempDir, PathBuf) {
    write_fixture("Aden_METAR_Final_Report.csv", &format!("{REPORT_HEADER}\n{REPORT_ROWS}"))
}
