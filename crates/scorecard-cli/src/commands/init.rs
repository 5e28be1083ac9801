//! The `scorecard init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("scorecard.toml").exists() {
        println!("scorecard.toml already exists, skipping.");
    } else {
        std::fs::write("scorecard.toml", SAMPLE_CONFIG)?;
        println!("Created scorecard.toml");
    }

    std::fs::create_dir_all("sample-data")?;
    for (name, content) in [("class.csv", SAMPLE_CLASS), ("maths.csv", SAMPLE_MATHS)] {
        let path = Path::new("sample-data").join(name);
        if path.exists() {
            println!("sample-data/{name} already exists, skipping.");
        } else {
            std::fs::write(&path, content)?;
            println!("Created sample-data/{name}");
        }
    }

    println!("\nNext steps:");
    println!("  1. Run: scorecard analyze sample-data/class.csv");
    println!("  2. Run: scorecard exam --name \"Mock 1\" --date 2024-05-01 --maths sample-data/maths.csv");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# scorecard configuration

# Questions per exam subject when an export's totals row has none.
default_total_questions = 0

# "derive" gives rows without an id a stable generated one; "reject" fails the upload.
missing_id_policy = "derive"

max_upload_bytes = 10485760

[total_questions]
# verbal = 80
# numerical = 50
# maths = 50
# reading = 40
"#;

const SAMPLE_CLASS: &str = "\
name,student_id,math,english,science
Alice Johnson,1001,92,88,95
Bob Smith,1002,75,68,72
Carla Diaz,1003,58,61,49
Dev Patel,1004,84,90,79
";

const SAMPLE_MATHS: &str = "\
Mathematics - Term 2 export
Points possible,,,,50
First Name,Last Name,SIS ID,Score,Score %
Alice,Johnson,1001,46,92%
Bob,Smith,1002,37,74%
Carla,Diaz,1003,29,58%
";
