use serde_json::{Map, Value, json};
use tracing::debug;

use crate::client::WorkspaceApi;
use crate::convert::{markdown_to_blocks, parse_inline};
use crate::error::{Error, Result};
use crate::normalize::{
    ObjectKind, Record, SearchResult, flatten_block, normalize_record, normalize_search_result,
};
use crate::paginate::fetch_all;
use crate::schema::{self, Schema};

// Mutation payloads cap out at this many children per append call.
const APPEND_CHUNK: usize = 100;

/// Search the workspace. One call; the optional kind filter is applied
/// both server-side (as the object filter) and client-side, since the
/// server one is advisory for mixed result sets.
pub fn search(
    api: &mut dyn WorkspaceApi,
    query: &str,
    kind: Option<ObjectKind>,
) -> Result<Vec<SearchResult>> {
    let page = api.search(
        query,
        kind.map(ObjectKind::api_filter_value),
        None,
        None,
    )?;
    let mut results: Vec<SearchResult> = page
        .results
        .iter()
        .filter_map(normalize_search_result)
        .collect();
    if let Some(kind) = kind {
        results.retain(|result| result.kind == kind);
    }
    debug!(query, count = results.len(), "search finished");
    Ok(results)
}

/// Every database visible to the token: an empty-query search with the
/// database filter, fully paginated.
pub fn list_databases(api: &mut dyn WorkspaceApi) -> Result<Vec<SearchResult>> {
    let filter = Some(ObjectKind::Database.api_filter_value());
    let items = fetch_all(
        |page_size, cursor| api.search("", filter, page_size, cursor),
        None,
    )?;
    Ok(items
        .iter()
        .filter_map(normalize_search_result)
        .filter(|result| result.kind == ObjectKind::Database)
        .collect())
}

#[derive(Debug, Clone)]
pub struct DatabaseQuery {
    pub schema: Schema,
    pub records: Vec<Record>,
}

/// Resolve the database schema, aggregate its rows (forwarding the
/// limit as the requested page size), and normalize each row.
pub fn query_database(
    api: &mut dyn WorkspaceApi,
    database_id: &str,
    limit: Option<usize>,
) -> Result<DatabaseQuery> {
    let schema = schema::resolve(api, database_id)?;
    let rows = fetch_all(
        |page_size, cursor| api.query_database(database_id, page_size, cursor),
        limit,
    )?;
    let records = rows
        .iter()
        .map(|row| normalize_record(row, &schema))
        .collect::<Vec<_>>();
    debug!(database_id, rows = records.len(), "database query finished");
    Ok(DatabaseQuery { schema, records })
}

#[derive(Debug, Clone)]
pub struct PageView {
    pub record: Record,
    pub created: Option<String>,
    pub content: Vec<String>,
}

/// Fetch one page and its block content. A page carries its own
/// property types, so its schema comes from the page payload itself.
pub fn get_page(api: &mut dyn WorkspaceApi, page_id: &str) -> Result<PageView> {
    let raw = api.retrieve_page(page_id)?;
    let page_schema = schema::schema_from_payload(page_id, &raw)?;
    let record = normalize_record(&raw, &page_schema);
    let created = raw
        .get("created_time")
        .and_then(Value::as_str)
        .map(ToString::to_string);

    let blocks = fetch_all(
        |page_size, cursor| api.list_block_children(page_id, page_size, cursor),
        None,
    )?;
    let content = blocks.iter().filter_map(flatten_block).collect();

    Ok(PageView {
        record,
        created,
        content,
    })
}

/// Create a task row. The title property name comes from the resolved
/// schema; a status option requires a status-typed field in the schema
/// (its detected name is used) and fails validation before any mutation
/// otherwise.
pub fn create_task(
    api: &mut dyn WorkspaceApi,
    database_id: &str,
    title: &str,
    status: Option<&str>,
) -> Result<Record> {
    let db_schema = schema::resolve(api, database_id)?;
    let mut properties = Map::new();
    properties.insert(db_schema.title_field.clone(), title_payload(title));
    if let Some(status) = status {
        let field = db_schema.field_of_kind("status").ok_or_else(|| {
            Error::Validation(format!(
                "database {database_id} has no status-typed field; cannot set --status"
            ))
        })?;
        properties.insert(field.to_string(), json!({ "status": { "name": status } }));
    }

    let created = api.create_page(database_id, Value::Object(properties))?;
    // Re-display only what the server acknowledged.
    Ok(normalize_record(&created, &db_schema))
}

/// Update a task's title and/or status. At least one option is
/// required; the no-op form is rejected before any network call. The
/// page is retrieved once to detect its own title/status field names.
pub fn update_task(
    api: &mut dyn WorkspaceApi,
    page_id: &str,
    title: Option<&str>,
    status: Option<&str>,
) -> Result<Record> {
    if title.is_none() && status.is_none() {
        return Err(Error::Validation(
            "task update requires at least one of --title or --status".to_string(),
        ));
    }

    let raw = api.retrieve_page(page_id)?;
    let page_schema = schema::schema_from_payload(page_id, &raw)?;

    let mut properties = Map::new();
    if let Some(title) = title {
        properties.insert(page_schema.title_field.clone(), title_payload(title));
    }
    if let Some(status) = status {
        let field = page_schema.field_of_kind("status").ok_or_else(|| {
            Error::Validation(format!(
                "page {page_id} has no status-typed field; cannot set --status"
            ))
        })?;
        properties.insert(field.to_string(), json!({ "status": { "name": status } }));
    }

    let updated = api.update_page(page_id, Value::Object(properties))?;
    Ok(normalize_record(&updated, &page_schema))
}

/// Convert markdown to blocks and append them to a page. Returns the
/// number of blocks appended.
pub fn append_page(api: &mut dyn WorkspaceApi, page_id: &str, markdown: &str) -> Result<usize> {
    let blocks = markdown_to_blocks(markdown);
    if blocks.is_empty() {
        return Err(Error::Validation(
            "no content blocks parsed from markdown input".to_string(),
        ));
    }
    let mut appended = 0;
    for chunk in blocks.chunks(APPEND_CHUNK) {
        api.append_block_children(page_id, chunk.to_vec())?;
        appended += chunk.len();
    }
    debug!(page_id, appended, "append finished");
    Ok(appended)
}

/// Delete every child block of a page. Returns the number deleted.
pub fn clear_page(api: &mut dyn WorkspaceApi, page_id: &str) -> Result<usize> {
    let blocks = fetch_all(
        |page_size, cursor| api.list_block_children(page_id, page_size, cursor),
        None,
    )?;
    let mut deleted = 0;
    for block in &blocks {
        if let Some(id) = block.get("id").and_then(Value::as_str) {
            api.delete_block(id)?;
            deleted += 1;
        }
    }
    Ok(deleted)
}

#[derive(Debug, Clone)]
pub struct BlockView {
    pub id: String,
    pub kind: String,
    pub line: Option<String>,
}

fn block_view(raw: &Value, block_id: &str) -> Result<BlockView> {
    let kind = raw
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Schema {
            identifier: block_id.to_string(),
            message: "block response carries no type tag".to_string(),
        })?;
    let id = raw
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or(block_id)
        .to_string();
    Ok(BlockView {
        id,
        kind: kind.to_string(),
        line: flatten_block(raw),
    })
}

/// Fetch one block by id.
pub fn get_block(api: &mut dyn WorkspaceApi, block_id: &str) -> Result<BlockView> {
    let raw = api.retrieve_block(block_id)?;
    block_view(&raw, block_id)
}

/// Replace a block's text content, keeping its type. The block is
/// retrieved first to learn its type tag; the new content goes through
/// the inline markdown parser.
pub fn update_block(api: &mut dyn WorkspaceApi, block_id: &str, content: &str) -> Result<BlockView> {
    if content.trim().is_empty() {
        return Err(Error::Validation(
            "block update requires non-empty content".to_string(),
        ));
    }
    let current = get_block(api, block_id)?;
    let payload = json!({ &current.kind: { "rich_text": parse_inline(content) } });
    let updated = api.update_block(block_id, payload)?;
    block_view(&updated, block_id)
}

/// Delete one block by id.
pub fn delete_block(api: &mut dyn WorkspaceApi, block_id: &str) -> Result<()> {
    api.delete_block(block_id)?;
    Ok(())
}

fn title_payload(title: &str) -> Value {
    json!({ "title": [ { "text": { "content": title } } ] })
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::{
        append_page, clear_page, create_task, delete_block, get_block, get_page, list_databases,
        query_database, search, update_block, update_task,
    };
    use crate::client::{QueryPage, WorkspaceApi};
    use crate::error::Error;
    use crate::normalize::{FieldValue, ObjectKind, UNTITLED};

    fn rich(text: &str) -> Value {
        json!([{ "plain_text": text }])
    }

    fn task_row(id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "object": "page",
            "properties": {
                "Name": { "type": "title", "title": rich(name) },
                "Status": { "type": "status", "status": { "name": "Todo" } },
            }
        })
    }

    #[derive(Default)]
    struct MockApi {
        database: Value,
        page: Value,
        block: Value,
        query_pages: Vec<QueryPage>,
        query_failures: Vec<usize>,
        search_pages: Vec<QueryPage>,
        block_pages: Vec<QueryPage>,
        create_response: Value,
        update_response: Value,
        requested_page_sizes: Vec<Option<u32>>,
        created_properties: Vec<Value>,
        updated_properties: Vec<(String, Value)>,
        updated_blocks: Vec<(String, Value)>,
        appended_children: Vec<Vec<Value>>,
        deleted_blocks: Vec<String>,
        query_calls: usize,
        search_calls: usize,
        block_calls: usize,
        request_count: usize,
    }

    impl WorkspaceApi for MockApi {
        fn search(
            &mut self,
            _query: &str,
            _object_filter: Option<&str>,
            page_size: Option<u32>,
            _cursor: Option<&str>,
        ) -> crate::error::Result<QueryPage> {
            self.request_count += 1;
            self.requested_page_sizes.push(page_size);
            let page = self.search_pages.get(self.search_calls).cloned();
            self.search_calls += 1;
            Ok(page.unwrap_or_default())
        }

        fn retrieve_database(&mut self, database_id: &str) -> crate::error::Result<Value> {
            self.request_count += 1;
            if self.database.is_null() {
                return Err(Error::NotFound(database_id.to_string()));
            }
            Ok(self.database.clone())
        }

        fn query_database(
            &mut self,
            _database_id: &str,
            page_size: Option<u32>,
            _cursor: Option<&str>,
        ) -> crate::error::Result<QueryPage> {
            self.request_count += 1;
            self.requested_page_sizes.push(page_size);
            let call = self.query_calls;
            self.query_calls += 1;
            if self.query_failures.contains(&call) {
                return Err(Error::Transient {
                    status: 503,
                    message: "scripted failure".to_string(),
                });
            }
            Ok(self.query_pages.get(call).cloned().unwrap_or_default())
        }

        fn retrieve_page(&mut self, page_id: &str) -> crate::error::Result<Value> {
            self.request_count += 1;
            if self.page.is_null() {
                return Err(Error::NotFound(page_id.to_string()));
            }
            Ok(self.page.clone())
        }

        fn create_page(
            &mut self,
            _database_id: &str,
            properties: Value,
        ) -> crate::error::Result<Value> {
            self.request_count += 1;
            self.created_properties.push(properties);
            Ok(self.create_response.clone())
        }

        fn update_page(&mut self, page_id: &str, properties: Value) -> crate::error::Result<Value> {
            self.request_count += 1;
            self.updated_properties
                .push((page_id.to_string(), properties));
            Ok(self.update_response.clone())
        }

        fn retrieve_block(&mut self, block_id: &str) -> crate::error::Result<Value> {
            self.request_count += 1;
            if self.block.is_null() {
                return Err(Error::NotFound(block_id.to_string()));
            }
            Ok(self.block.clone())
        }

        fn update_block(
            &mut self,
            block_id: &str,
            payload: Value,
        ) -> crate::error::Result<Value> {
            self.request_count += 1;
            self.updated_blocks.push((block_id.to_string(), payload));
            Ok(self.block.clone())
        }

        fn list_block_children(
            &mut self,
            _block_id: &str,
            _page_size: Option<u32>,
            _cursor: Option<&str>,
        ) -> crate::error::Result<QueryPage> {
            self.request_count += 1;
            let page = self.block_pages.get(self.block_calls).cloned();
            self.block_calls += 1;
            Ok(page.unwrap_or_default())
        }

        fn append_block_children(
            &mut self,
            _block_id: &str,
            children: Vec<Value>,
        ) -> crate::error::Result<Value> {
            self.request_count += 1;
            self.appended_children.push(children);
            Ok(json!({ "object": "list" }))
        }

        fn delete_block(&mut self, block_id: &str) -> crate::error::Result<Value> {
            self.request_count += 1;
            self.deleted_blocks.push(block_id.to_string());
            Ok(json!({ "id": block_id, "archived": true }))
        }

        fn request_count(&self) -> usize {
            self.request_count
        }
    }

    fn task_database() -> Value {
        json!({
            "id": "db123",
            "object": "database",
            "properties": {
                "Name": { "type": "title", "title": {} },
                "Status": { "type": "status", "status": {} },
                "Due": { "type": "date", "date": {} },
            }
        })
    }

    #[test]
    fn db_query_limit_is_a_prefix_with_server_side_page_size() {
        let pages = vec![
            QueryPage {
                results: (0..8).map(|i| task_row(&format!("a{i}"), "A")).collect(),
                next_cursor: Some("c1".to_string()),
                has_more: true,
            },
            QueryPage {
                results: (0..8).map(|i| task_row(&format!("b{i}"), "B")).collect(),
                next_cursor: None,
                has_more: false,
            },
        ];

        let mut api = MockApi {
            database: task_database(),
            query_pages: pages.clone(),
            ..Default::default()
        };
        let limited = query_database(&mut api, "db123", Some(10)).expect("query");
        assert_eq!(limited.records.len(), 10);
        assert!(api.requested_page_sizes[0].expect("page size") <= 10);

        let mut api = MockApi {
            database: task_database(),
            query_pages: pages,
            ..Default::default()
        };
        let unlimited = query_database(&mut api, "db123", None).expect("query");
        assert_eq!(unlimited.records.len(), 16);
        for (limited, full) in limited.records.iter().zip(unlimited.records.iter()) {
            assert_eq!(limited.id, full.id);
        }
    }

    #[test]
    fn db_query_normalizes_rows_against_the_schema() {
        let mut api = MockApi {
            database: task_database(),
            query_pages: vec![QueryPage {
                results: vec![task_row("r1", "Ship it")],
                next_cursor: None,
                has_more: false,
            }],
            ..Default::default()
        };
        let result = query_database(&mut api, "db123", None).expect("query");
        assert_eq!(result.schema.title_field, "Name");
        let record = &result.records[0];
        assert_eq!(record.title, "Ship it");
        let value_of = |name: &str| {
            record
                .values
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value.clone())
                .expect("field present")
        };
        assert_eq!(value_of("Name"), FieldValue::Text("Ship it".to_string()));
        assert_eq!(value_of("Status"), FieldValue::Label("Todo".to_string()));
        assert_eq!(value_of("Due"), FieldValue::Empty);
    }

    #[test]
    fn db_query_page_failure_discards_the_partial_listing() {
        let mut api = MockApi {
            database: task_database(),
            query_pages: vec![QueryPage {
                results: (0..50).map(|i| task_row(&format!("a{i}"), "A")).collect(),
                next_cursor: Some("c1".to_string()),
                has_more: true,
            }],
            query_failures: vec![1],
            ..Default::default()
        };
        let error = query_database(&mut api, "db123", None).expect_err("must fail");
        assert!(matches!(error, Error::Transient { .. }));
    }

    #[test]
    fn db_query_surfaces_missing_database() {
        let mut api = MockApi::default();
        let error = query_database(&mut api, "db404", None).expect_err("must fail");
        assert!(matches!(error, Error::NotFound(id) if id == "db404"));
    }

    #[test]
    fn search_filters_by_kind_client_side() {
        let mut api = MockApi {
            search_pages: vec![QueryPage {
                results: vec![
                    json!({ "object": "page", "id": "p1", "properties": {
                        "Name": { "type": "title", "title": rich("Plan") } } }),
                    json!({ "object": "data_source", "id": "db1", "title": rich("Tasks") }),
                ],
                next_cursor: None,
                has_more: false,
            }],
            ..Default::default()
        };
        let results = search(&mut api, "plan", Some(ObjectKind::Page)).expect("search");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "p1");
        assert_eq!(api.request_count(), 1);
    }

    #[test]
    fn list_databases_walks_every_page() {
        let mut api = MockApi {
            search_pages: vec![
                QueryPage {
                    results: vec![json!({ "object": "data_source", "id": "db1", "title": rich("A") })],
                    next_cursor: Some("c1".to_string()),
                    has_more: true,
                },
                QueryPage {
                    results: vec![json!({ "object": "data_source", "id": "db2", "title": rich("B") })],
                    next_cursor: None,
                    has_more: false,
                },
            ],
            ..Default::default()
        };
        let databases = list_databases(&mut api).expect("list");
        assert_eq!(databases.len(), 2);
        assert_eq!(databases[1].title, "B");
        assert_eq!(api.search_calls, 2);
    }

    #[test]
    fn get_page_normalizes_and_flattens_content() {
        let mut api = MockApi {
            page: json!({
                "id": "p1",
                "created_time": "2026-01-01T00:00:00Z",
                "properties": {
                    "Name": { "type": "title", "title": rich("Roadmap") },
                }
            }),
            block_pages: vec![QueryPage {
                results: vec![
                    json!({ "id": "b1", "type": "heading_1",
                            "heading_1": { "rich_text": rich("Q3") } }),
                    json!({ "id": "b2", "type": "paragraph",
                            "paragraph": { "rich_text": rich("Ship the CLI") } }),
                ],
                next_cursor: None,
                has_more: false,
            }],
            ..Default::default()
        };
        let view = get_page(&mut api, "p1").expect("get page");
        assert_eq!(view.record.title, "Roadmap");
        assert_eq!(view.created.as_deref(), Some("2026-01-01T00:00:00Z"));
        assert_eq!(view.content, vec!["# Q3", "Ship the CLI"]);
    }

    #[test]
    fn create_task_uses_the_detected_title_and_status_fields() {
        let mut api = MockApi {
            database: task_database(),
            create_response: task_row("created-1", "New task"),
            ..Default::default()
        };
        let record =
            create_task(&mut api, "db123", "New task", Some("Doing")).expect("create");
        assert_eq!(record.id, "created-1");
        assert_eq!(record.title, "New task");

        let sent = &api.created_properties[0];
        assert_eq!(
            sent["Name"]["title"][0]["text"]["content"],
            "New task"
        );
        assert_eq!(sent["Status"]["status"]["name"], "Doing");
    }

    #[test]
    fn create_task_rejects_status_without_a_status_field() {
        let mut api = MockApi {
            database: json!({
                "id": "db9",
                "properties": { "Name": { "type": "title" } }
            }),
            ..Default::default()
        };
        let error = create_task(&mut api, "db9", "T", Some("Doing")).expect_err("must fail");
        assert!(matches!(error, Error::Validation(_)));
        assert!(api.created_properties.is_empty());
    }

    #[test]
    fn update_task_with_no_options_makes_no_network_call() {
        let mut api = MockApi::default();
        let error = update_task(&mut api, "p1", None, None).expect_err("must fail");
        assert!(matches!(error, Error::Validation(_)));
        assert_eq!(api.request_count(), 0);
    }

    #[test]
    fn update_task_detects_field_names_from_the_page() {
        let mut api = MockApi {
            page: json!({
                "id": "p1",
                "properties": {
                    "Objective": { "type": "title", "title": rich("Old") },
                    "Stage": { "type": "status", "status": { "name": "Todo" } },
                }
            }),
            update_response: json!({
                "id": "p1",
                "properties": {
                    "Objective": { "type": "title", "title": rich("New title") },
                    "Stage": { "type": "status", "status": { "name": "Done" } },
                }
            }),
            ..Default::default()
        };
        let record =
            update_task(&mut api, "p1", Some("New title"), Some("Done")).expect("update");
        assert_eq!(record.title, "New title");

        let (page_id, sent) = &api.updated_properties[0];
        assert_eq!(page_id, "p1");
        assert_eq!(sent["Objective"]["title"][0]["text"]["content"], "New title");
        assert_eq!(sent["Stage"]["status"]["name"], "Done");
    }

    #[test]
    fn update_task_status_requires_a_status_field_on_the_page() {
        let mut api = MockApi {
            page: json!({
                "id": "p1",
                "properties": { "Name": { "type": "title", "title": [] } }
            }),
            ..Default::default()
        };
        let error = update_task(&mut api, "p1", None, Some("Done")).expect_err("must fail");
        assert!(matches!(error, Error::Validation(_)));
        assert!(api.updated_properties.is_empty());
    }

    #[test]
    fn update_response_without_title_value_normalizes_to_untitled() {
        let mut api = MockApi {
            page: json!({
                "id": "p1",
                "properties": { "Name": { "type": "title", "title": rich("Old") } }
            }),
            update_response: json!({
                "id": "p1",
                "properties": { "Name": { "type": "title", "title": [] } }
            }),
            ..Default::default()
        };
        let record = update_task(&mut api, "p1", Some("ignored"), None).expect("update");
        assert_eq!(record.title, UNTITLED);
    }

    #[test]
    fn append_page_converts_markdown_and_counts_blocks() {
        let mut api = MockApi::default();
        let appended =
            append_page(&mut api, "p1", "# Title\n\n- [ ] task one\n").expect("append");
        assert_eq!(appended, 2);
        assert_eq!(api.appended_children[0][0]["type"], "heading_1");
        assert_eq!(api.appended_children[0][1]["type"], "to_do");
    }

    #[test]
    fn append_page_rejects_empty_markdown() {
        let mut api = MockApi::default();
        let error = append_page(&mut api, "p1", "\n\n").expect_err("must fail");
        assert!(matches!(error, Error::Validation(_)));
        assert_eq!(api.request_count(), 0);
    }

    #[test]
    fn clear_page_deletes_each_child_block() {
        let mut api = MockApi {
            block_pages: vec![QueryPage {
                results: vec![json!({ "id": "b1" }), json!({ "id": "b2" })],
                next_cursor: None,
                has_more: false,
            }],
            ..Default::default()
        };
        let deleted = clear_page(&mut api, "p1").expect("clear");
        assert_eq!(deleted, 2);
        assert_eq!(api.deleted_blocks, vec!["b1", "b2"]);
    }

    #[test]
    fn get_block_reports_type_and_flattened_content() {
        let mut api = MockApi {
            block: json!({ "id": "b1", "type": "to_do", "to_do": {
                "rich_text": rich("write tests"), "checked": false
            }}),
            ..Default::default()
        };
        let view = get_block(&mut api, "b1").expect("get block");
        assert_eq!(view.id, "b1");
        assert_eq!(view.kind, "to_do");
        assert_eq!(view.line.as_deref(), Some("[ ] write tests"));
    }

    #[test]
    fn get_block_surfaces_missing_block() {
        let mut api = MockApi::default();
        let error = get_block(&mut api, "b404").expect_err("must fail");
        assert!(matches!(error, Error::NotFound(id) if id == "b404"));
    }

    #[test]
    fn update_block_keeps_the_detected_type() {
        let mut api = MockApi {
            block: json!({ "id": "b1", "type": "heading_2",
                           "heading_2": { "rich_text": rich("Old") } }),
            ..Default::default()
        };
        let view = update_block(&mut api, "b1", "New heading").expect("update");
        assert_eq!(view.kind, "heading_2");

        let (block_id, sent) = &api.updated_blocks[0];
        assert_eq!(block_id, "b1");
        assert_eq!(
            sent["heading_2"]["rich_text"][0]["text"]["content"],
            "New heading"
        );
    }

    #[test]
    fn update_block_rejects_empty_content_before_any_call() {
        let mut api = MockApi::default();
        let error = update_block(&mut api, "b1", "  ").expect_err("must fail");
        assert!(matches!(error, Error::Validation(_)));
        assert_eq!(api.request_count(), 0);
    }

    #[test]
    fn update_block_without_a_type_tag_is_a_schema_error() {
        let mut api = MockApi {
            block: json!({ "id": "b1" }),
            ..Default::default()
        };
        let error = update_block(&mut api, "b1", "text").expect_err("must fail");
        assert!(matches!(error, Error::Schema { .. }));
        assert!(api.updated_blocks.is_empty());
    }

    #[test]
    fn delete_block_calls_through() {
        let mut api = MockApi {
            block: json!({ "id": "b1", "type": "paragraph",
                           "paragraph": { "rich_text": rich("gone") } }),
            ..Default::default()
        };
        delete_block(&mut api, "b1").expect("delete");
        assert_eq!(api.deleted_blocks, vec!["b1"]);
    }
}
