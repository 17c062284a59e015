//! Declarative catalog of the recruiting API tools
//!
//! Each tool is a resource path plus the parameters it accepts. Tool calls
//! are turned into a [`PageRequest`] (reads) or a JSON body (writes) here;
//! the shell only performs the HTTP call.

use crate::envelope::HttpMethod;
use crate::pagination::{FilterParams, PageRequest, PaginationError, ParamValue, CURSOR_PARAM};
use serde_json::{json, Map, Value};

/// Page size parameter accepted by every read tool
pub const PER_PAGE_PARAM: &str = "per_page";

/// Error type for tool argument handling
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolArgError {
    #[error("arguments must be a JSON object")]
    NotAnObject,

    #[error("missing required argument '{0}'")]
    Missing(String),

    #[error("unknown argument '{0}'")]
    Unknown(String),

    #[error("argument '{name}' must be {expected}")]
    InvalidType { name: String, expected: &'static str },

    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Number,
    Boolean,
}

impl ParamKind {
    pub fn json_type(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
        }
    }

    /// Whether a JSON argument fits this kind; `null` always does
    ///
    /// String parameters also take a list of scalars, sent comma-joined.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (ParamKind::String, Value::String(_) | Value::Array(_))
                | (ParamKind::Number, Value::Number(_))
                | (ParamKind::Boolean, Value::Bool(_))
        )
    }

    fn expected(&self) -> &'static str {
        match self {
            ParamKind::String => "a string or a list of scalars",
            ParamKind::Number => "a number",
            ParamKind::Boolean => "a boolean",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
}

const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        description,
        required: false,
    }
}

const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        description,
        required: true,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub method: HttpMethod,
    /// Resource path, `{name}` segments are filled from arguments
    pub path: &'static str,
    pub params: &'static [ParamSpec],
}

const IDS: ParamSpec = optional(
    "ids",
    ParamKind::String,
    "Comma-separated list of ids to return",
);
const CREATED_AFTER: ParamSpec = optional(
    "created_after",
    ParamKind::String,
    "Only records created at or after this ISO-8601 timestamp",
);
const UPDATED_AFTER: ParamSpec = optional(
    "updated_after",
    ParamKind::String,
    "Only records updated at or after this ISO-8601 timestamp",
);
const JOB_ID: ParamSpec = optional("job_id", ParamKind::Number, "Filter by job id");
const CANDIDATE_ID: ParamSpec = optional("candidate_id", ParamKind::Number, "Filter by candidate id");
const APPLICATION_ID: ParamSpec = optional(
    "application_id",
    ParamKind::Number,
    "Filter by application id",
);

pub const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "list_jobs",
        description: "List jobs, optionally filtered by status, department, office or requisition id.",
        method: HttpMethod::Get,
        path: "/jobs",
        params: &[
            IDS,
            optional("status", ParamKind::String, "Job status: open, closed or draft"),
            optional("department_id", ParamKind::Number, "Filter by department id"),
            optional("office_id", ParamKind::Number, "Filter by office id"),
            optional("requisition_id", ParamKind::String, "Filter by requisition id"),
            CREATED_AFTER,
            UPDATED_AFTER,
        ],
    },
    ToolSpec {
        name: "list_job_posts",
        description: "List job posts, the public advertisements attached to jobs.",
        method: HttpMethod::Get,
        path: "/job_posts",
        params: &[
            IDS,
            JOB_ID,
            optional("live", ParamKind::Boolean, "Only posts that are live on a job board"),
            optional("active", ParamKind::Boolean, "Only active posts"),
            UPDATED_AFTER,
        ],
    },
    ToolSpec {
        name: "list_job_stages",
        description: "List the interview stages configured for jobs.",
        method: HttpMethod::Get,
        path: "/job_stages",
        params: &[IDS, JOB_ID, UPDATED_AFTER],
    },
    ToolSpec {
        name: "list_openings",
        description: "List job openings (headcount slots) and whether they are filled.",
        method: HttpMethod::Get,
        path: "/openings",
        params: &[
            IDS,
            JOB_ID,
            optional("status", ParamKind::String, "Opening status: open or closed"),
        ],
    },
    ToolSpec {
        name: "list_candidates",
        description: "List candidates, optionally filtered by email, job or timestamps.",
        method: HttpMethod::Get,
        path: "/candidates",
        params: &[
            IDS,
            optional("email", ParamKind::String, "Exact candidate email address"),
            JOB_ID,
            CREATED_AFTER,
            UPDATED_AFTER,
        ],
    },
    ToolSpec {
        name: "list_applications",
        description: "List applications linking candidates to jobs, with their current stage and status.",
        method: HttpMethod::Get,
        path: "/applications",
        params: &[
            IDS,
            CANDIDATE_ID,
            JOB_ID,
            optional(
                "status",
                ParamKind::String,
                "Application status: active, rejected, hired or converted",
            ),
            CREATED_AFTER,
            optional(
                "last_activity_after",
                ParamKind::String,
                "Only applications with activity at or after this ISO-8601 timestamp",
            ),
        ],
    },
    ToolSpec {
        name: "list_offers",
        description: "List offers made to candidates.",
        method: HttpMethod::Get,
        path: "/offers",
        params: &[
            IDS,
            APPLICATION_ID,
            optional("status", ParamKind::String, "Offer status: unresolved, accepted, rejected or deprecated"),
            CREATED_AFTER,
            UPDATED_AFTER,
        ],
    },
    ToolSpec {
        name: "list_scorecards",
        description: "List interview scorecards submitted by interviewers.",
        method: HttpMethod::Get,
        path: "/scorecards",
        params: &[IDS, APPLICATION_ID, CANDIDATE_ID, UPDATED_AFTER],
    },
    ToolSpec {
        name: "list_scheduled_interviews",
        description: "List scheduled interviews with their time slots and interviewers.",
        method: HttpMethod::Get,
        path: "/scheduled_interviews",
        params: &[
            IDS,
            APPLICATION_ID,
            optional("starts_after", ParamKind::String, "Only interviews starting at or after this ISO-8601 timestamp"),
            optional("ends_before", ParamKind::String, "Only interviews ending before this ISO-8601 timestamp"),
        ],
    },
    ToolSpec {
        name: "list_users",
        description: "List users of the recruiting account (recruiters, coordinators, interviewers).",
        method: HttpMethod::Get,
        path: "/users",
        params: &[
            IDS,
            optional("email", ParamKind::String, "Exact user email address"),
            optional("employee_id", ParamKind::String, "Filter by employee id"),
            optional("disabled", ParamKind::Boolean, "Only disabled (true) or enabled (false) users"),
        ],
    },
    ToolSpec {
        name: "list_departments",
        description: "List departments.",
        method: HttpMethod::Get,
        path: "/departments",
        params: &[IDS],
    },
    ToolSpec {
        name: "list_offices",
        description: "List offices.",
        method: HttpMethod::Get,
        path: "/offices",
        params: &[IDS],
    },
    ToolSpec {
        name: "list_sources",
        description: "List candidate sources (job boards, referrals, agencies).",
        method: HttpMethod::Get,
        path: "/sources",
        params: &[IDS],
    },
    ToolSpec {
        name: "list_rejection_reasons",
        description: "List the reasons available when rejecting an application.",
        method: HttpMethod::Get,
        path: "/rejection_reasons",
        params: &[
            IDS,
            optional("include_defaults", ParamKind::Boolean, "Include the built-in default reasons"),
        ],
    },
    ToolSpec {
        name: "list_close_reasons",
        description: "List the reasons available when closing an opening.",
        method: HttpMethod::Get,
        path: "/close_reasons",
        params: &[IDS],
    },
    ToolSpec {
        name: "list_tags",
        description: "List candidate tags.",
        method: HttpMethod::Get,
        path: "/tags",
        params: &[IDS],
    },
    ToolSpec {
        name: "list_prospect_pools",
        description: "List prospect pools and their stages.",
        method: HttpMethod::Get,
        path: "/prospect_pools",
        params: &[IDS],
    },
    ToolSpec {
        name: "list_custom_fields",
        description: "List custom field definitions.",
        method: HttpMethod::Get,
        path: "/custom_fields",
        params: &[
            IDS,
            optional("field_type", ParamKind::String, "Object the field applies to: candidate, application, job, offer, opening or user"),
        ],
    },
    ToolSpec {
        name: "list_notes",
        description: "List notes left on candidate profiles.",
        method: HttpMethod::Get,
        path: "/notes",
        params: &[IDS, CANDIDATE_ID, CREATED_AFTER],
    },
    ToolSpec {
        name: "list_candidate_tags",
        description: "List the tags applied to one candidate.",
        method: HttpMethod::Get,
        path: "/candidates/{candidate_id}/tags",
        params: &[required("candidate_id", ParamKind::Number, "Candidate id")],
    },
    ToolSpec {
        name: "create_note",
        description: "Add a note to a candidate profile on behalf of a user.",
        method: HttpMethod::Post,
        path: "/notes",
        params: &[
            required("candidate_id", ParamKind::Number, "Candidate the note is about"),
            required("user_id", ParamKind::Number, "User the note is attributed to"),
            required("body", ParamKind::String, "Note text"),
            optional("visibility", ParamKind::String, "admin_only, private or public (default: public)"),
        ],
    },
    ToolSpec {
        name: "add_candidate_tag",
        description: "Apply an existing tag to a candidate.",
        method: HttpMethod::Post,
        path: "/candidates/{candidate_id}/tags",
        params: &[
            required("candidate_id", ParamKind::Number, "Candidate id"),
            required("tag_id", ParamKind::Number, "Tag to apply"),
        ],
    },
];

/// Look up a tool by name
pub fn find_tool(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|tool| tool.name == name)
}

/// Normalize raw tool-call arguments into a JSON object
///
/// Missing or `null` arguments become an empty object.
pub fn arguments_object(arguments: Option<Value>) -> Result<Map<String, Value>, ToolArgError> {
    match arguments {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(ToolArgError::NotAnObject),
    }
}

impl ToolSpec {
    /// Names of the `{placeholder}` segments in the path
    pub fn placeholders(&self) -> Vec<&'static str> {
        self.path
            .split('/')
            .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
            .collect()
    }

    fn is_placeholder(&self, name: &str) -> bool {
        self.placeholders().iter().any(|placeholder| *placeholder == name)
    }

    /// Kind of a declared argument, `None` when the tool does not take it
    fn kind_of(&self, name: &str) -> Option<ParamKind> {
        self.params
            .iter()
            .find(|param| param.name == name)
            .map(|param| param.kind)
            .or_else(|| {
                (self.method == HttpMethod::Get && name == PER_PAGE_PARAM).then_some(ParamKind::Number)
            })
    }

    fn check(&self, name: &str, value: &Value) -> Result<(), ToolArgError> {
        let kind = self
            .kind_of(name)
            .ok_or_else(|| ToolArgError::Unknown(name.to_string()))?;
        if kind.accepts(value) {
            Ok(())
        } else {
            Err(ToolArgError::InvalidType {
                name: name.to_string(),
                expected: kind.expected(),
            })
        }
    }

    /// JSON Schema advertised to MCP clients
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in self.params {
            properties.insert(
                param.name.to_string(),
                json!({
                    "type": param.kind.json_type(),
                    "description": param.description,
                }),
            );
        }

        if self.method == HttpMethod::Get {
            properties.insert(
                PER_PAGE_PARAM.to_string(),
                json!({
                    "type": "number",
                    "description": "Number of records per page (upstream default applies when omitted)",
                }),
            );
            properties.insert(
                CURSOR_PARAM.to_string(),
                json!({
                    "type": "string",
                    "description": "Continuation token from a previous response's nextCursor. When set, pass no filters other than path arguments.",
                }),
            );
        }

        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|param| param.required)
            .map(|param| param.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Fill the path placeholders from the arguments
    pub fn render_path(&self, args: &Map<String, Value>) -> Result<String, ToolArgError> {
        let segments = self
            .path
            .split('/')
            .map(|segment| {
                match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(name) => {
                        if let Some(value) = args.get(name) {
                            self.check(name, value)?;
                        }
                        let value = match args.get(name) {
                            None | Some(Value::Null) => {
                                return Err(ToolArgError::Missing(name.to_string()))
                            }
                            Some(Value::String(s)) if s.is_empty() => {
                                return Err(ToolArgError::Missing(name.to_string()))
                            }
                            Some(Value::String(s)) => s.clone(),
                            Some(Value::Number(n)) => n.to_string(),
                            Some(_) => {
                                return Err(ToolArgError::InvalidType {
                                    name: name.to_string(),
                                    expected: "a string or a number",
                                })
                            }
                        };
                        Ok(urlencoding::encode(&value).into_owned())
                    }
                    None => Ok(segment.to_string()),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(segments.join("/"))
    }

    /// Filter parameters for a read tool, excluding the cursor and path arguments
    pub fn filters(&self, args: &Map<String, Value>) -> Result<FilterParams, ToolArgError> {
        let mut filters = FilterParams::new();
        for (name, value) in args {
            if name == CURSOR_PARAM || self.is_placeholder(name) {
                continue;
            }
            self.check(name, value)?;
            filters.insert(name.clone(), param_value(name, value)?);
        }
        Ok(filters)
    }

    /// Build the page request for a read tool
    pub fn page_request(&self, args: &Map<String, Value>) -> Result<PageRequest, ToolArgError> {
        let cursor = match args.get(CURSOR_PARAM) {
            None | Some(Value::Null) => None,
            Some(Value::String(cursor)) => Some(cursor.clone()),
            Some(_) => {
                return Err(ToolArgError::InvalidType {
                    name: CURSOR_PARAM.to_string(),
                    expected: "a string",
                })
            }
        };

        Ok(PageRequest::resolve(cursor, self.filters(args)?)?)
    }

    /// JSON body for a write tool
    ///
    /// Path arguments are excluded and `null` values dropped.
    pub fn body(&self, args: &Map<String, Value>) -> Result<Value, ToolArgError> {
        for param in self.params.iter().filter(|param| param.required) {
            match args.get(param.name) {
                None | Some(Value::Null) => return Err(ToolArgError::Missing(param.name.to_string())),
                Some(_) => {}
            }
        }

        let mut body = Map::new();
        for (name, value) in args {
            if self.is_placeholder(name) || value.is_null() {
                continue;
            }
            self.check(name, value)?;
            body.insert(name.clone(), value.clone());
        }
        Ok(Value::Object(body))
    }
}

fn param_value(name: &str, value: &Value) -> Result<ParamValue, ToolArgError> {
    match value {
        Value::Null => Ok(ParamValue::Absent),
        Value::String(s) => Ok(ParamValue::Text(s.clone())),
        Value::Number(n) => Ok(ParamValue::Number(n.clone())),
        Value::Bool(b) => Ok(ParamValue::Bool(*b)),
        Value::Array(items) => {
            let parts = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    Value::Number(n) => Ok(n.to_string()),
                    Value::Bool(b) => Ok(b.to_string()),
                    _ => Err(ToolArgError::InvalidType {
                        name: name.to_string(),
                        expected: "a scalar or a list of scalars",
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ParamValue::Text(parts.join(",")))
        }
        Value::Object(_) => Err(ToolArgError::InvalidType {
            name: name.to_string(),
            expected: "a scalar or a list of scalars",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::Cursor;
    use std::collections::HashSet;

    fn args(value: Value) -> Map<String, Value> {
        arguments_object(Some(value)).unwrap()
    }

    #[test]
    fn test_tool_names_are_unique() {
        let names: HashSet<_> = TOOLS.iter().map(|tool| tool.name).collect();
        assert_eq!(names.len(), TOOLS.len());
    }

    #[test]
    fn test_placeholders_are_required_params() {
        for tool in TOOLS {
            for placeholder in tool.placeholders() {
                let param = tool
                    .params
                    .iter()
                    .find(|param| param.name == placeholder)
                    .unwrap_or_else(|| panic!("{}: undeclared {}", tool.name, placeholder));
                assert!(param.required, "{}: {} not required", tool.name, placeholder);
            }
        }
    }

    #[test]
    fn test_read_tools_only_require_path_arguments() {
        for tool in TOOLS.iter().filter(|tool| tool.method == HttpMethod::Get) {
            for param in tool.params.iter().filter(|param| param.required) {
                assert!(
                    tool.placeholders().contains(&param.name),
                    "{}: {} would conflict with cursor requests",
                    tool.name,
                    param.name
                );
            }
        }
    }

    #[test]
    fn test_input_schema_for_read_tool() {
        let schema = find_tool("list_jobs").unwrap().input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["cursor"]["type"], "string");
        assert_eq!(schema["properties"]["per_page"]["type"], "number");
        assert_eq!(schema["properties"]["department_id"]["type"], "number");
        assert_eq!(schema["required"], json!([]));
    }

    #[test]
    fn test_input_schema_for_write_tool() {
        let schema = find_tool("create_note").unwrap().input_schema();
        assert!(schema["properties"].get("cursor").is_none());
        assert_eq!(schema["required"], json!(["candidate_id", "user_id", "body"]));
    }

    #[test]
    fn test_arguments_object() {
        assert!(arguments_object(None).unwrap().is_empty());
        assert!(arguments_object(Some(Value::Null)).unwrap().is_empty());
        assert_eq!(
            arguments_object(Some(json!([1]))),
            Err(ToolArgError::NotAnObject)
        );
    }

    #[test]
    fn test_render_path() {
        let tool = find_tool("list_candidate_tags").unwrap();
        assert_eq!(
            tool.render_path(&args(json!({"candidate_id": 42}))).unwrap(),
            "/candidates/42/tags"
        );
        assert_eq!(
            tool.render_path(&args(json!({}))),
            Err(ToolArgError::Missing("candidate_id".into()))
        );
        assert!(matches!(
            tool.render_path(&args(json!({"candidate_id": true}))),
            Err(ToolArgError::InvalidType { .. })
        ));
    }

    #[test]
    fn test_page_request_filtered() {
        let tool = find_tool("list_applications").unwrap();
        let request = tool
            .page_request(&args(json!({
                "job_id": 7,
                "status": "active",
                "ids": [1, 2, 3],
                "created_after": null,
                "last_activity_after": ""
            })))
            .unwrap();

        let PageRequest::Filtered(filters) = request else {
            panic!("expected a filtered request");
        };
        let mut pairs = filters.query_pairs();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("ids".to_string(), "1,2,3".to_string()),
                ("job_id".to_string(), "7".to_string()),
                ("status".to_string(), "active".to_string()),
            ]
        );
    }

    #[test]
    fn test_page_request_cursored_ignores_path_arguments() {
        let tool = find_tool("list_candidate_tags").unwrap();
        let request = tool
            .page_request(&args(json!({"candidate_id": 42, "cursor": "abc"})))
            .unwrap();
        assert_eq!(
            request,
            PageRequest::Cursored(Cursor::new("abc").unwrap())
        );
    }

    #[test]
    fn test_page_request_cursor_with_filters_fails() {
        let tool = find_tool("list_jobs").unwrap();
        let err = tool
            .page_request(&args(json!({"cursor": "abc", "status": "open"})))
            .unwrap_err();
        assert_eq!(
            err,
            ToolArgError::Pagination(PaginationError::CursorWithFilters(vec!["status".into()]))
        );
    }

    #[test]
    fn test_page_request_rejects_unknown_and_bad_values() {
        let tool = find_tool("list_jobs").unwrap();
        assert_eq!(
            tool.page_request(&args(json!({"colour": "red"}))),
            Err(ToolArgError::Unknown("colour".into()))
        );
        assert!(matches!(
            tool.page_request(&args(json!({"status": {"nested": true}}))),
            Err(ToolArgError::InvalidType { .. })
        ));
        assert!(matches!(
            tool.page_request(&args(json!({"cursor": 5}))),
            Err(ToolArgError::InvalidType { .. })
        ));
    }

    #[test]
    fn test_argument_kinds_are_enforced() {
        let tags = find_tool("list_candidate_tags").unwrap();
        assert_eq!(
            tags.render_path(&args(json!({"candidate_id": "abc"}))),
            Err(ToolArgError::InvalidType {
                name: "candidate_id".into(),
                expected: "a number",
            })
        );

        let jobs = find_tool("list_jobs").unwrap();
        assert!(matches!(
            jobs.page_request(&args(json!({"department_id": "abc"}))),
            Err(ToolArgError::InvalidType { .. })
        ));
        assert!(matches!(
            jobs.page_request(&args(json!({"per_page": "50"}))),
            Err(ToolArgError::InvalidType { .. })
        ));
        assert!(jobs
            .page_request(&args(json!({"ids": [1, 2], "department_id": null})))
            .is_ok());

        let note = find_tool("create_note").unwrap();
        assert_eq!(
            note.body(&args(json!({"candidate_id": "abc", "user_id": 2, "body": "x"}))),
            Err(ToolArgError::InvalidType {
                name: "candidate_id".into(),
                expected: "a number",
            })
        );
    }

    #[test]
    fn test_body_for_write_tool() {
        let tool = find_tool("add_candidate_tag").unwrap();
        let body = tool
            .body(&args(json!({"candidate_id": 42, "tag_id": 9})))
            .unwrap();
        assert_eq!(body, json!({"tag_id": 9}));
    }

    #[test]
    fn test_body_drops_nulls_and_checks_required() {
        let tool = find_tool("create_note").unwrap();
        let body = tool
            .body(&args(json!({
                "candidate_id": 1,
                "user_id": 2,
                "body": "Strong systems background",
                "visibility": null
            })))
            .unwrap();
        assert_eq!(
            body,
            json!({"candidate_id": 1, "user_id": 2, "body": "Strong systems background"})
        );

        assert_eq!(
            tool.body(&args(json!({"candidate_id": 1, "user_id": 2}))),
            Err(ToolArgError::Missing("body".into()))
        );
    }
}
