//! Shared fixtures for unit tests.

use std::path::PathBuf;

use crate::dataset::{CsvRowSource, RowSource};
use crate::schema::{PassengerRecord, PredictionRecord};

/// Head of the Kaggle training file, plus passenger 62 who has no port.
pub(crate) const TRAIN_CSV: &str = "\
PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
1,0,3,\"Braund, Mr. Owen Harris\",male,22,1,0,A/5 21171,7.25,,S
2,1,1,\"Cumings, Mrs. John Bradley (Florence Briggs Thayer)\",female,38,1,0,PC 17599,71.2833,C85,C
3,1,3,\"Heikkinen, Miss. Laina\",female,26,0,0,STON/O2. 3101282,7.925,,S
4,1,1,\"Futrelle, Mrs. Jacques Heath (Lily May Peel)\",female,35,1,0,113803,53.1,C123,S
5,0,3,\"Allen, Mr. William Henry\",male,35,0,0,373450,8.05,,S
6,0,3,\"Moran, Mr. James\",male,,0,0,330877,8.4583,,Q
7,0,1,\"McCarthy, Mr. Timothy J\",male,54,0,0,17463,51.8625,E46,S
8,0,3,\"Palsson, Master. Gosta Leonard\",male,2,3,1,349909,21.075,,S
9,1,3,\"Johnson, Mrs. Oscar W (Elisabeth Vilhelmina Berg)\",female,27,0,2,347742,11.1333,,S
10,1,2,\"Nasser, Mrs. Nicholas (Adele Achem)\",female,14,1,0,237736,30.0708,,C
11,1,3,\"Sandstrom, Miss. Marguerite Rut\",female,4,1,1,PP 9549,16.7,G6,S
12,1,1,\"Bonnell, Miss. Elizabeth\",female,58,0,0,113783,26.55,C103,S
13,0,3,\"Saundercock, Mr. William Henry\",male,20,0,0,A/5. 2151,8.05,,S
14,0,3,\"Andersson, Mr. Anders Johan\",male,39,1,5,347082,31.275,,S
15,0,3,\"Vestrom, Miss. Hulda Amanda Adolfina\",female,14,0,0,350406,7.8542,,S
16,1,2,\"Hewlett, Mrs. (Mary D Kingcome) \",female,55,0,0,248706,16,,S
17,0,3,\"Rice, Master. Eugene\",male,2,4,1,382652,29.125,,Q
18,1,2,\"Williams, Mr. Charles Eugene\",male,,0,0,244373,13,,S
19,0,3,\"Vander Planke, Mrs. Julius (Emelia Maria Vandemoortele)\",female,31,1,0,345763,18,,S
20,1,3,\"Masselmani, Mrs. Fatima\",female,,0,0,2649,7.225,,C
21,0,2,\"Fynney, Mr. Joseph J\",male,35,0,0,239865,26,,S
22,1,2,\"Beesley, Mr. Lawrence\",male,34,0,0,248698,13,D56,S
23,1,3,\"McGowan, Miss. Anna \"\"Annie\"\"\",female,15,0,0,330923,8.0292,,Q
24,1,1,\"Sloper, Mr. William Thompson\",male,28,0,0,113788,35.5,A6,S
25,0,3,\"Palsson, Miss. Torborg Danira\",female,8,3,1,349909,21.075,,S
26,1,3,\"Asplund, Mrs. Carl Oscar (Selma Augusta Emilia Johansson)\",female,38,1,5,347077,31.3875,,S
27,0,3,\"Emir, Mr. Farred Chehab\",male,,0,0,2631,7.225,,C
28,0,1,\"Fortune, Mr. Charles Alexander\",male,19,3,2,19950,263,C23 C25 C27,S
29,1,3,\"O'Dwyer, Miss. Ellen \"\"Nellie\"\"\",female,,0,0,330959,7.8792,,Q
30,0,3,\"Todoroff, Mr. Lalio\",male,,0,0,349216,7.8958,,S
31,0,1,\"Uruchurtu, Don. Manuel E\",male,40,0,0,PC 17601,27.7208,,C
32,1,1,\"Spencer, Mrs. William Augustus (Marie Eugenie)\",female,,1,0,PC 17569,146.5208,B78,C
33,1,3,\"Glynn, Miss. Mary Agatha\",female,,0,0,335677,7.75,,Q
34,0,2,\"Wheadon, Mr. Edward H\",male,66,0,0,C.A. 24579,10.5,,S
35,0,1,\"Meyer, Mr. Edgar Joseph\",male,28,1,0,PC 17604,82.1708,,C
36,0,1,\"Holverson, Mr. Alexander Oskar\",male,42,1,0,113789,52,,S
37,1,3,\"Mamee, Mr. Hanna\",male,,0,0,2677,7.2292,,C
38,0,3,\"Cann, Mr. Ernest Charles\",male,21,0,0,A./5. 2152,8.05,,S
39,0,3,\"Vander Planke, Miss. Augusta Maria\",female,18,2,0,345764,18,,S
40,1,3,\"Nicola-Yarred, Miss. Jamila\",female,14,1,0,2651,11.2417,,C
41,0,3,\"Ahlin, Mrs. Johan (Johanna Persdotter Larsson)\",female,40,1,0,7546,9.475,,S
42,0,2,\"Turpin, Mrs. William John Robert (Dorothy Ann Wonnacott)\",female,27,1,0,11668,21,,S
43,0,3,\"Kraeff, Mr. Theodor\",male,,0,0,349253,7.8958,,C
44,1,2,\"Laroche, Miss. Simonne Marie Anne Andree\",female,3,1,2,SC/Paris 2123,41.5792,,C
45,1,3,\"Devaney, Miss. Margaret Delia\",female,19,0,0,330958,7.8792,,Q
62,1,1,\"Icard, Miss. Amelie\",female,38,0,0,113572,80,B28,
";

/// Head of the Kaggle test file, plus passenger 1044 who has no fare.
pub(crate) const TEST_CSV: &str = "\
PassengerId,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
892,3,\"Kelly, Mr. James\",male,34.5,0,0,330911,7.8292,,Q
893,3,\"Wilkes, Mrs. James (Ellen Needs)\",female,47,1,0,363272,7,,S
894,2,\"Myles, Mr. Thomas Francis\",male,62,0,0,240276,9.6875,,Q
895,3,\"Wirz, Mr. Albert\",male,27,0,0,315154,8.6625,,S
896,3,\"Hirvonen, Mrs. Alexander (Helga E Lindqvist)\",female,22,1,1,3101298,12.2875,,S
897,3,\"Svensson, Mr. Johan Cervin\",male,14,0,0,7538,9.225,,S
898,3,\"Connolly, Miss. Kate\",female,30,0,0,330972,7.6292,,Q
899,2,\"Caldwell, Mr. Albert Francis\",male,26,1,1,248738,29,,S
900,3,\"Abrahim, Mrs. Joseph (Sophie Halaut Easu)\",female,18,0,0,2657,7.2292,,C
901,3,\"Davies, Mr. John Samuel\",male,21,2,0,A/4 48871,24.15,,S
1044,3,\"Storey, Mr. Thomas\",male,60.5,0,0,3701,,,S
";

pub(crate) fn train_rows() -> Vec<PassengerRecord> {
    CsvRowSource::from_reader(TRAIN_CSV.as_bytes())
        .read_rows(None)
        .unwrap()
}

pub(crate) fn test_rows() -> Vec<PredictionRecord> {
    CsvRowSource::from_reader(TEST_CSV.as_bytes())
        .read_rows(None)
        .unwrap()
}

/// Build a labeled row from the fields the transformer chain reads.
#[allow(clippy::too_many_arguments)]
pub(crate) fn passenger(
    id: i64,
    class: i64,
    gender: &str,
    age: Option<f64>,
    sibsp: i64,
    parch: i64,
    embarked: Option<&str>,
    survived: bool,
) -> PassengerRecord {
    PassengerRecord {
        passenger: PredictionRecord {
            passenger_id: id,
            passenger_class: Some(class),
            name: format!("Passenger {}", id),
            gender: Some(gender.to_string()),
            age,
            siblings_or_spouses: sibsp,
            parents_or_children: parch,
            ticket: "T".to_string(),
            fare: Some(10.0),
            cabin: None,
            embarked: embarked.map(str::to_string),
        },
        survived,
    }
}

/// Unique path under the system temp dir.
pub(crate) fn temp_path(name: &str) -> PathBuf {
    let file = format!("titanic_survival_{}_{}", std::process::id(), name);
    std::env::temp_dir().join(file)
}
