use jobly::{CompanySearch, JobSearch, Sql};

fn params(sql: &Sql) -> Vec<String> {
    sql.params().iter().map(|p| format!("{p:?}")).collect()
}

#[test]
fn company_without_criteria_renders_nothing() {
    let sql = CompanySearch::default().where_clause().unwrap();
    assert_eq!(sql.to_sql(), "");
    assert!(params(&sql).is_empty());
}

#[test]
fn company_predicate_order_ignores_query_order() {
    let shuffled = [("maxEmployees", "900"), ("name", "net"), ("minEmployees", "5")];
    let declared = [("name", "net"), ("minEmployees", "5"), ("maxEmployees", "900")];
    let a = CompanySearch::from_query(shuffled).unwrap().where_clause().unwrap();
    let b = CompanySearch::from_query(declared).unwrap().where_clause().unwrap();

    let expected = "WHERE name LIKE $1 AND num_employees >= $2 AND num_employees <= $3";
    assert_eq!(a.to_sql(), expected);
    assert_eq!(b.to_sql(), expected);
    assert_eq!(params(&a), vec![r#""%net%""#, "5", "900"]);
}

#[test]
fn company_name_is_bound_not_interpolated() {
    let sql = CompanySearch::from_query([("name", "x' OR '1'='1")])
        .unwrap()
        .where_clause()
        .unwrap();
    assert_eq!(sql.to_sql(), "WHERE name LIKE $1");
    assert!(!sql.to_sql().contains("OR"));
}

#[test]
fn company_bounds_must_be_numbers() {
    let err = CompanySearch::from_query([("minEmployees", "abc")])
        .unwrap()
        .where_clause()
        .unwrap_err();
    assert!(err.is_bad_request());
    assert_eq!(err.to_string(), "Bad request: minEmployees must be a number");

    let err = CompanySearch::from_query([("maxEmployees", "lots")])
        .unwrap()
        .where_clause()
        .unwrap_err();
    assert_eq!(err.to_string(), "Bad request: maxEmployees must be a number");
}

#[test]
fn company_min_above_max_is_rejected() {
    let err = CompanySearch::from_query([("minEmployees", "10"), ("maxEmployees", "2")])
        .unwrap()
        .where_clause()
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[test]
fn unknown_filter_keys_are_rejected() {
    let err = CompanySearch::from_query([("handle", "c1")]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Bad request: handle not recognized as appropriate filter parameter"
    );
    assert!(JobSearch::from_query([("equity", "0.1")]).is_err());
}

#[test]
fn job_has_equity_true_adds_literal_predicate() {
    let sql = JobSearch::from_query([("hasEquity", "true")])
        .unwrap()
        .where_clause()
        .unwrap();
    assert_eq!(sql.to_sql(), "WHERE equity > 0");
    assert!(params(&sql).is_empty());
}

#[test]
fn job_has_equity_false_adds_nothing() {
    let sql = JobSearch::from_query([("title", "dev"), ("hasEquity", "false")])
        .unwrap()
        .where_clause()
        .unwrap();
    assert_eq!(sql.to_sql(), "WHERE title LIKE $1");
}

#[test]
fn job_has_equity_must_be_boolean_text() {
    for bad in ["maybe", "TRUE", "1"] {
        let err = JobSearch::from_query([("hasEquity", bad)])
            .unwrap()
            .where_clause()
            .unwrap_err();
        assert_eq!(err.to_string(), "Bad request: hasEquity must be a either true or false");
    }
}

#[test]
fn job_all_criteria() {
    let sql = JobSearch::from_query([("hasEquity", "true"), ("minSalary", "5000"), ("title", "j")])
        .unwrap()
        .where_clause()
        .unwrap();
    assert_eq!(sql.to_sql(), "WHERE title LIKE $1 AND salary >= $2 AND equity > 0");
    assert_eq!(params(&sql), vec![r#""%j%""#, "5000"]);
}

#[test]
fn search_structs_deserialize_camel_case() {
    let search: JobSearch =
        serde_json::from_str(r#"{"minSalary": "100", "hasEquity": "true"}"#).unwrap();
    assert_eq!(search.min_salary.as_deref(), Some("100"));
    assert!(!search.is_empty());
}
