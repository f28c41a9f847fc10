//! Statement parsing and end-to-end planning through a session

use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use vidql::catalog::{Catalog, ColumnType, NdArrayType};
use vidql::parser::{parse_sql, parse_sql_statements, Statement};
use vidql::planner::{LogicalOperator, OperatorType};
use vidql::registry::Capabilities;
use vidql::{PlannerConfig, PlanningSession, QueryError};

#[test]
fn test_statement_kinds() {
    let cases = [
        ("SELECT id FROM MyVideo", "SELECT"),
        ("INSERT INTO MyVideo (id) VALUES (1)", "INSERT"),
        ("CREATE TABLE t (id INTEGER)", "CREATE TABLE"),
        ("LOAD DATA INFILE 'a.mp4' INTO MyVideo", "LOAD DATA"),
        (
            "CREATE UDF f INPUT (x INTEGER) OUTPUT (y INTEGER) IMPL 'f.py'",
            "CREATE UDF",
        ),
        ("DROP TABLE t", "UNSUPPORTED"),
    ];

    for (sql, kind) in cases {
        let statement = parse_sql(sql).unwrap();
        assert_eq!(statement.kind(), kind, "{}", sql);
    }
}

#[test]
fn test_select_lowering() {
    let statement = parse_sql("SELECT id, data FROM MyVideo WHERE id > 2 AND id < 10").unwrap();
    let Statement::Select(select) = statement else {
        panic!("expected SELECT");
    };

    assert_eq!(select.from_table.unwrap().table_info.table_name, "MyVideo");
    assert_eq!(select.target_list.len(), 2);
    assert!(select.where_clause.is_some());
}

#[test]
fn test_select_rejects_unplanned_clauses() {
    for sql in [
        "SELECT id FROM MyVideo ORDER BY id",
        "SELECT id FROM MyVideo LIMIT 5",
        "SELECT a.id FROM MyVideo a JOIN Other b ON a.id = b.id",
    ] {
        let err = parse_sql(sql).unwrap_err();
        assert!(matches!(err, QueryError::NotImplemented(_)), "{}: {:?}", sql, err);
    }
}

#[test]
fn test_create_udf_full_form() {
    let sql = "CREATE UDF IF NOT EXISTS FastRCNNObjectDetector \
               INPUT (Frame_Array NDARRAY UINT8(3, ANYDIM, ANYDIM)) \
               OUTPUT (labels NDARRAY STR(10), bboxes NDARRAY FLOAT32(ANYDIM, 4), scores NDARRAY FLOAT32(ANYDIM)) \
               TYPE Classification \
               IMPL 'udfs/fastrcnn_object_detector.py'";

    let Statement::CreateUdf(udf) = parse_sql(sql).unwrap() else {
        panic!("expected CREATE UDF");
    };

    assert_eq!(udf.name, "FastRCNNObjectDetector");
    assert!(udf.if_not_exists);
    assert_eq!(udf.udf_type.as_deref(), Some("Classification"));
    assert_eq!(udf.impl_path, PathBuf::from("udfs/fastrcnn_object_detector.py"));

    assert_eq!(udf.inputs.len(), 1);
    let frame = &udf.inputs[0];
    assert_eq!(frame.col_type, ColumnType::NdArray);
    assert_eq!(frame.array_type, Some(NdArrayType::UInt8));
    assert_eq!(frame.dimensions, vec![Some(3), None, None]);

    let outputs: Vec<&str> = udf.outputs.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(outputs, vec!["labels", "bboxes", "scores"]);
    assert_eq!(udf.outputs[0].array_type, Some(NdArrayType::Unicode));
}

#[test]
fn test_create_udf_requires_impl() {
    let err = parse_sql("CREATE UDF f INPUT (x INTEGER) OUTPUT (y INTEGER)").unwrap_err();
    assert!(matches!(err, QueryError::Parse(_)));
}

#[test]
fn test_create_table_columns() {
    let sql = "CREATE TABLE IF NOT EXISTS Detections (\
               id INTEGER NOT NULL, label TEXT(30), score FLOAT(10, 2), frame NDARRAY UINT8(ANYDIM))";

    let Statement::CreateTable(create) = parse_sql(sql).unwrap() else {
        panic!("expected CREATE TABLE");
    };

    assert!(create.if_not_exists);
    assert_eq!(create.table_ref.table_info.table_name, "Detections");
    let types: Vec<ColumnType> = create.column_list.iter().map(|c| c.col_type).collect();
    assert_eq!(
        types,
        vec![
            ColumnType::Integer,
            ColumnType::Text,
            ColumnType::Float,
            ColumnType::NdArray
        ]
    );
    assert!(!create.column_list[0].nullable);
    assert!(create.column_list[1].nullable);
    assert_eq!(create.column_list[3].dimensions, vec![None]);
}

#[test]
fn test_unknown_column_type() {
    let err = parse_sql("CREATE TABLE t (id BLOB)").unwrap_err();
    assert!(matches!(err, QueryError::Parse(msg) if msg.contains("BLOB")));
}

#[test]
fn test_load_data_with_table_keyword() {
    let Statement::LoadData(load) =
        parse_sql("LOAD DATA INFILE 'data/counts.csv' INTO TABLE Counts").unwrap()
    else {
        panic!("expected LOAD DATA");
    };
    assert_eq!(load.table.table_info.table_name, "Counts");
    assert_eq!(load.path, PathBuf::from("data/counts.csv"));
}

#[test]
fn test_multiple_statements() {
    let statements = parse_sql_statements(
        "LOAD DATA INFILE 'a.mp4' INTO MyVideo; SELECT id FROM MyVideo;;",
    )
    .unwrap();
    let kinds: Vec<&str> = statements.iter().map(|s| s.kind()).collect();
    assert_eq!(kinds, vec!["LOAD DATA", "SELECT"]);

    let err = parse_sql("SELECT 1; SELECT 2").unwrap_err();
    assert!(matches!(err, QueryError::Parse(_)));
}

#[test]
fn test_empty_input() {
    assert!(parse_sql_statements("  ; ").unwrap().is_empty());
    assert!(matches!(parse_sql(""), Err(QueryError::Parse(_))));
}

#[test]
fn test_session_from_catalog_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "datasets": [
                {{
                    "name": "Detections",
                    "columns": [
                        {{"name": "id", "col_type": "Integer"}},
                        {{"name": "label", "col_type": "Text"}}
                    ]
                }}
            ]
        }}"#
    )
    .unwrap();

    let config = PlannerConfig::new()
        .with_catalog_path(file.path())
        .with_capabilities(Capabilities::default().with_gpu(true));
    let catalog = config.load_catalog().unwrap();
    assert!(catalog.get_dataset("detections").is_some());

    let session = PlanningSession::with_config(catalog, config);
    let planned = session
        .plan_sql("SELECT label FROM Detections WHERE Score(label) > 0.5")
        .unwrap();

    assert!(planned.use_gpu);
    assert!(planned.loader.is_none());
    assert_eq!(
        planned.plan.operator_chain(),
        vec![OperatorType::Filter, OperatorType::Project, OperatorType::Get]
    );
}

#[test]
fn test_missing_catalog_file() {
    let config = PlannerConfig::new().with_catalog_path("/nonexistent/catalog.json");
    assert!(matches!(config.load_catalog(), Err(QueryError::Io(_))));
}

#[test]
fn test_session_picks_loader_by_extension() {
    let session = PlanningSession::new(vidql::InMemoryCatalog::new());

    let csv = session
        .plan_sql("LOAD DATA INFILE 'data/meta.CSV' INTO Meta")
        .unwrap();
    assert_eq!(csv.loader.map(|l| l.name), Some("csv"));

    let video = session
        .plan_sql("LOAD DATA INFILE 'data/clip.mp4' INTO Clip")
        .unwrap();
    let loader = video.loader.unwrap();
    assert_eq!(loader.name, "video");
    assert!(loader.decodes_video);

    match video.plan.operator() {
        LogicalOperator::LoadData(node) => {
            assert_eq!(node.dataset.column_names(), vec!["id", "data"]);
            assert!(node.dataset.is_video);
        }
        other => panic!("expected LoadData, got {:?}", other),
    }
}

#[test]
fn test_session_reports_bind_errors() {
    let session = PlanningSession::new(vidql::InMemoryCatalog::new());
    session
        .plan_sql("LOAD DATA INFILE 'data/clip.mp4' INTO Clip")
        .unwrap();

    let err = session.plan_sql("SELECT missing FROM Clip").unwrap_err();
    assert!(matches!(err, QueryError::ColumnNotFound(_)));

    let err = session
        .plan_sql("INSERT INTO Clip (id) VALUES (1, 2)")
        .unwrap_err();
    assert!(matches!(err, QueryError::Bind(_)));

    let err = session.plan_sql("SELECT id FROM Clip WHERE id").unwrap_err();
    assert!(matches!(err, QueryError::Bind(_)));
}
