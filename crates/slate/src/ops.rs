//! The operation catalog and dispatch tables.
//!
//! Every remote operation is one variant of a closed enum. Resolution
//! mirrors the service's three dispatch tables: the `event`/`email` module
//! names bind against the event table; everything else tries the
//! public/media table first and falls back to the generic data table.
//!
//! [`Operation::spec`] is the single mapping from an operation to its wire
//! verb, declared parameters, payload formatter, transport, and result
//! shape. No behavior hides in inheritance - adding an operation means
//! adding a variant and one `spec` arm.

use slateproto::{DynamicDefault, ParamDefault, ParamSpec};

/// Generic per-module data operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOp {
    FindOne,
    Find,
    Summary,
    Create,
    Update,
    Delete,
    Fields,
    RelationFields,
    CreationRequireFields,
    Tag,
}

/// Media, path, and other public operations, resolved before the data table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicOp {
    Upload,
    GetMemberData,
    GetParentDir,
    GetChildrenDir,
    GetBrotherDir,
    GetTemplatePath,
    GetItemPath,
    CreateMedia,
    UpdateMedia,
    GetMediaData,
    GetBestMediaServer,
    GetMediaServer,
    GetMediaServerStatus,
    ClearMediaThumbnail,
    GetMediaFullPath,
    SelectMediaData,
    GetEventServer,
}

/// Operations against the separately-resolved event/email endpoint set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOp {
    Create,
    FindOne,
    Find,
    Fields,
    SendEmail,
}

/// One resolved operation, ready to be bound to a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Data(DataOp),
    Public(PublicOp),
    Event(EventOp),
}

/// How the merged payload is rewritten before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Formatter {
    /// Pass the merged payload through unchanged.
    Identity,
    /// Translate `filter`/`fields`/`order` for query endpoints.
    Query,
    /// Payload becomes the caller's `data`, tagged with the module.
    CreateData,
    /// Like `CreateData`, plus the target `id`.
    UpdateData,
    /// Payload is the target `id` only.
    IdOnly,
    /// `{link_id, tag_id, module}`.
    TagLink,
    /// `{link_module_id, user_id}`.
    MemberData,
    /// Resolve a module name to `{link_module_id, link_id, code}`.
    LinkPath,
    /// Flat media filter; the module key is removed.
    MediaFilter,
    /// `{link_module_id, link_id, media_data, media_server}`.
    SaveMedia,
    /// Custom event: payload becomes `data` with `type: "custom"`.
    EventTag,
    /// `{param: {addressee, subject}, data: {template, content}}`.
    Email,
}

/// Where the single HTTP request goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transport {
    /// `POST <base>/api/<segment>/<verb>` with the session token header.
    Module,
    /// Multipart upload to the resolved media server.
    MediaUpload,
    /// One of the event server's endpoints; no session token.
    Event(EventEndpoint),
    /// The email endpoint, signed via query string; no session token.
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventEndpoint {
    Add,
    Find,
    Select,
    Fields,
}

/// How a successful envelope's `data` is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResultShape {
    /// Single object tagged with the bound module; empty data → nothing.
    Tagged,
    /// First element of a result list, module-tagged.
    First,
    /// `data.rows`, each row module-tagged.
    Rows,
    /// `data.total` as a scalar.
    Total,
    /// `fixed_field` and `custom_field` merged into one catalog.
    FieldCatalog,
    /// `data.relation`, or empty.
    RelationCatalog,
    /// `data.require_field`, untouched.
    RequiredFields,
    /// `data.param`, untouched.
    MediaParam,
    /// First element of a result list, untagged (event lookups).
    EventFirst,
    /// `data.fixed_field`, or empty (event field catalog).
    EventFieldCatalog,
    /// `data` untouched.
    Raw,
}

/// Everything the command layer needs to run one operation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CommandSpec {
    pub verb: &'static str,
    pub params: &'static [ParamSpec],
    /// Attach the bound module tag to the merged payload (set-if-absent).
    pub attach_module: bool,
    pub formatter: Formatter,
    pub transport: Transport,
    pub shape: ResultShape,
    /// Fixed URL segment overriding the module-derived one.
    pub segment: Option<&'static str>,
}

const QUERY_PARAMS: &[ParamSpec] = &[
    ParamSpec::defaulted("filter", ParamDefault::List),
    ParamSpec::optional("fields", ParamDefault::List),
    ParamSpec::optional("order", ParamDefault::Map),
    ParamSpec::optional("page", ParamDefault::Page),
];

const CREATE_PARAMS: &[ParamSpec] = &[ParamSpec::required("data")];

const UPDATE_PARAMS: &[ParamSpec] = &[ParamSpec::required("id"), ParamSpec::required("data")];

const ID_PARAMS: &[ParamSpec] = &[ParamSpec::required("id")];

const TAG_PARAMS: &[ParamSpec] = &[ParamSpec::required("id"), ParamSpec::required("tag_id")];

const UPLOAD_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("file_path"),
    ParamSpec::optional(
        "server",
        ParamDefault::Dynamic(DynamicDefault::BestMediaServer),
    ),
];

const MEMBER_DATA_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("user_id"),
    ParamSpec::required("module_id"),
];

const LINK_PATH_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("module"),
    ParamSpec::required("id"),
    ParamSpec::optional("template_code", ParamDefault::Text("")),
];

const SAVE_MEDIA_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("module"),
    ParamSpec::required("id"),
    ParamSpec::required("media_data"),
    ParamSpec::optional(
        "media_server",
        ParamDefault::Dynamic(DynamicDefault::BestMediaServer),
    ),
];

const FILTER_PARAMS: &[ParamSpec] = &[ParamSpec::required("filter")];

const THUMB_PATH_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("filter"),
    ParamSpec::optional("size", ParamDefault::Text("origin")),
];

const SELECT_MEDIA_DATA_PARAMS: &[ParamSpec] = &[
    ParamSpec::required("server_id"),
    ParamSpec::required("md5_name_list"),
];

const SERVER_ID_PARAMS: &[ParamSpec] = &[ParamSpec::required("server_id")];

const EMAIL_PARAMS: &[ParamSpec] = &[
    ParamSpec::defaulted("addressee_list", ParamDefault::List),
    ParamSpec::defaulted("subject", ParamDefault::List),
    ParamSpec::required("template"),
    ParamSpec::required("content"),
];

const NO_PARAMS: &[ParamSpec] = &[];

impl Operation {
    /// Dispatch-table key of this operation, used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Data(DataOp::FindOne) => "find_one",
            Self::Data(DataOp::Find) => "find",
            Self::Data(DataOp::Summary) => "summary",
            Self::Data(DataOp::Create) => "create",
            Self::Data(DataOp::Update) => "update",
            Self::Data(DataOp::Delete) => "delete",
            Self::Data(DataOp::Fields) => "fields",
            Self::Data(DataOp::RelationFields) => "relation_fields",
            Self::Data(DataOp::CreationRequireFields) => "creation_require_fields",
            Self::Data(DataOp::Tag) => "tag",
            Self::Public(PublicOp::Upload) => "upload",
            Self::Public(PublicOp::GetMemberData) => "get_member_data",
            Self::Public(PublicOp::GetParentDir) => "get_parent_dir",
            Self::Public(PublicOp::GetChildrenDir) => "get_children_dir",
            Self::Public(PublicOp::GetBrotherDir) => "get_brother_dir",
            Self::Public(PublicOp::GetTemplatePath) => "get_template_path",
            Self::Public(PublicOp::GetItemPath) => "get_item_path",
            Self::Public(PublicOp::CreateMedia) => "create_media",
            Self::Public(PublicOp::UpdateMedia) => "update_media",
            Self::Public(PublicOp::GetMediaData) => "get_media_data",
            Self::Public(PublicOp::GetBestMediaServer) => "get_best_media_server",
            Self::Public(PublicOp::GetMediaServer) => "get_media_server",
            Self::Public(PublicOp::GetMediaServerStatus) => "get_media_server_status",
            Self::Public(PublicOp::ClearMediaThumbnail) => "clear_media_thumbnail",
            Self::Public(PublicOp::GetMediaFullPath) => "get_media_full_path",
            Self::Public(PublicOp::SelectMediaData) => "select_media_data",
            Self::Public(PublicOp::GetEventServer) => "get_event_server",
            Self::Event(EventOp::Create) => "create",
            Self::Event(EventOp::FindOne) => "find_one",
            Self::Event(EventOp::Find) => "find",
            Self::Event(EventOp::Fields) => "fields",
            Self::Event(EventOp::SendEmail) => "send_email",
        }
    }

    pub(crate) fn spec(&self) -> CommandSpec {
        let base = CommandSpec {
            verb: "",
            params: NO_PARAMS,
            attach_module: true,
            formatter: Formatter::Identity,
            transport: Transport::Module,
            shape: ResultShape::Tagged,
            segment: None,
        };
        match self {
            Self::Data(op) => match op {
                DataOp::FindOne => CommandSpec {
                    verb: "find",
                    params: QUERY_PARAMS,
                    formatter: Formatter::Query,
                    shape: ResultShape::First,
                    ..base
                },
                DataOp::Find => CommandSpec {
                    verb: "select",
                    params: QUERY_PARAMS,
                    formatter: Formatter::Query,
                    shape: ResultShape::Rows,
                    ..base
                },
                DataOp::Summary => CommandSpec {
                    verb: "select",
                    params: QUERY_PARAMS,
                    formatter: Formatter::Query,
                    shape: ResultShape::Total,
                    ..base
                },
                DataOp::Create => CommandSpec {
                    verb: "create",
                    params: CREATE_PARAMS,
                    formatter: Formatter::CreateData,
                    ..base
                },
                DataOp::Update => CommandSpec {
                    verb: "update",
                    params: UPDATE_PARAMS,
                    formatter: Formatter::UpdateData,
                    ..base
                },
                DataOp::Delete => CommandSpec {
                    verb: "delete",
                    params: ID_PARAMS,
                    formatter: Formatter::IdOnly,
                    shape: ResultShape::Raw,
                    ..base
                },
                DataOp::Fields => CommandSpec {
                    verb: "fields",
                    shape: ResultShape::FieldCatalog,
                    ..base
                },
                DataOp::RelationFields => CommandSpec {
                    verb: "fields",
                    shape: ResultShape::RelationCatalog,
                    ..base
                },
                DataOp::CreationRequireFields => CommandSpec {
                    verb: "fields",
                    shape: ResultShape::RequiredFields,
                    ..base
                },
                DataOp::Tag => CommandSpec {
                    verb: "tag",
                    params: TAG_PARAMS,
                    formatter: Formatter::TagLink,
                    ..base
                },
            },
            Self::Public(op) => match op {
                PublicOp::Upload => CommandSpec {
                    verb: "upload",
                    params: UPLOAD_PARAMS,
                    transport: Transport::MediaUpload,
                    shape: ResultShape::Raw,
                    ..base
                },
                PublicOp::GetMemberData => CommandSpec {
                    verb: "getMemberData",
                    params: MEMBER_DATA_PARAMS,
                    formatter: Formatter::MemberData,
                    shape: ResultShape::Raw,
                    ..base
                },
                PublicOp::GetParentDir => CommandSpec {
                    verb: "getParentDir",
                    params: ID_PARAMS,
                    shape: ResultShape::Raw,
                    ..base
                },
                PublicOp::GetChildrenDir => CommandSpec {
                    verb: "getChildren",
                    params: ID_PARAMS,
                    shape: ResultShape::Raw,
                    ..base
                },
                PublicOp::GetBrotherDir => CommandSpec {
                    verb: "getBrotherDirs",
                    params: ID_PARAMS,
                    shape: ResultShape::Raw,
                    ..base
                },
                PublicOp::GetTemplatePath => CommandSpec {
                    verb: "getTemplatePath",
                    params: LINK_PATH_PARAMS,
                    formatter: Formatter::LinkPath,
                    shape: ResultShape::Raw,
                    ..base
                },
                PublicOp::GetItemPath => CommandSpec {
                    verb: "getItemPath",
                    params: LINK_PATH_PARAMS,
                    formatter: Formatter::LinkPath,
                    shape: ResultShape::Raw,
                    ..base
                },
                PublicOp::CreateMedia => CommandSpec {
                    verb: "createMedia",
                    params: SAVE_MEDIA_PARAMS,
                    formatter: Formatter::SaveMedia,
                    ..base
                },
                PublicOp::UpdateMedia => CommandSpec {
                    verb: "updateMedia",
                    params: SAVE_MEDIA_PARAMS,
                    formatter: Formatter::SaveMedia,
                    ..base
                },
                PublicOp::GetMediaData => CommandSpec {
                    verb: "getMediaData",
                    params: FILTER_PARAMS,
                    formatter: Formatter::MediaFilter,
                    shape: ResultShape::MediaParam,
                    ..base
                },
                PublicOp::GetBestMediaServer => CommandSpec {
                    verb: "getMediaUploadServer",
                    ..base
                },
                PublicOp::GetMediaServer => CommandSpec {
                    verb: "getMediaServerItem",
                    params: SERVER_ID_PARAMS,
                    ..base
                },
                PublicOp::GetMediaServerStatus => CommandSpec {
                    verb: "getMediaServerStatus",
                    shape: ResultShape::Raw,
                    ..base
                },
                PublicOp::ClearMediaThumbnail => CommandSpec {
                    verb: "clearMediaThumbnail",
                    params: FILTER_PARAMS,
                    formatter: Formatter::MediaFilter,
                    ..base
                },
                PublicOp::GetMediaFullPath => CommandSpec {
                    verb: "getSpecifySizeThumbPath",
                    params: THUMB_PATH_PARAMS,
                    formatter: Formatter::MediaFilter,
                    shape: ResultShape::Raw,
                    ..base
                },
                PublicOp::SelectMediaData => CommandSpec {
                    verb: "selectMediaData",
                    params: SELECT_MEDIA_DATA_PARAMS,
                    shape: ResultShape::MediaParam,
                    ..base
                },
                PublicOp::GetEventServer => CommandSpec {
                    verb: "getEventLogServer",
                    attach_module: false,
                    shape: ResultShape::Raw,
                    segment: Some("event"),
                    ..base
                },
            },
            Self::Event(op) => match op {
                EventOp::Create => CommandSpec {
                    verb: "add",
                    params: CREATE_PARAMS,
                    attach_module: false,
                    formatter: Formatter::EventTag,
                    transport: Transport::Event(EventEndpoint::Add),
                    shape: ResultShape::Raw,
                    ..base
                },
                EventOp::FindOne => CommandSpec {
                    verb: "find",
                    params: QUERY_PARAMS,
                    attach_module: false,
                    transport: Transport::Event(EventEndpoint::Find),
                    shape: ResultShape::EventFirst,
                    ..base
                },
                EventOp::Find => CommandSpec {
                    verb: "select",
                    params: QUERY_PARAMS,
                    attach_module: false,
                    transport: Transport::Event(EventEndpoint::Select),
                    shape: ResultShape::Raw,
                    ..base
                },
                EventOp::Fields => CommandSpec {
                    verb: "fields",
                    attach_module: false,
                    transport: Transport::Event(EventEndpoint::Fields),
                    shape: ResultShape::EventFieldCatalog,
                    ..base
                },
                EventOp::SendEmail => CommandSpec {
                    verb: "send",
                    params: EMAIL_PARAMS,
                    attach_module: false,
                    formatter: Formatter::Email,
                    transport: Transport::Email,
                    shape: ResultShape::Raw,
                    ..base
                },
            },
        }
    }
}

/// The event/email dispatch table.
pub(crate) fn event_table(operation: &str) -> Option<EventOp> {
    match operation {
        "create" => Some(EventOp::Create),
        "find_one" => Some(EventOp::FindOne),
        "find" => Some(EventOp::Find),
        "fields" => Some(EventOp::Fields),
        "send_email" => Some(EventOp::SendEmail),
        _ => None,
    }
}

/// The public/media dispatch table, consulted before the data table.
pub(crate) fn public_table(operation: &str) -> Option<PublicOp> {
    match operation {
        "upload" => Some(PublicOp::Upload),
        "get_member_data" => Some(PublicOp::GetMemberData),
        "get_parent_dir" => Some(PublicOp::GetParentDir),
        "get_children_dir" => Some(PublicOp::GetChildrenDir),
        "get_brother_dir" => Some(PublicOp::GetBrotherDir),
        "get_template_path" => Some(PublicOp::GetTemplatePath),
        "get_item_path" => Some(PublicOp::GetItemPath),
        "create_media" => Some(PublicOp::CreateMedia),
        "update_media" => Some(PublicOp::UpdateMedia),
        "get_media_data" => Some(PublicOp::GetMediaData),
        "get_best_media_server" => Some(PublicOp::GetBestMediaServer),
        "get_media_server" => Some(PublicOp::GetMediaServer),
        "get_media_server_status" => Some(PublicOp::GetMediaServerStatus),
        "clear_media_thumbnail" => Some(PublicOp::ClearMediaThumbnail),
        "get_media_full_path" => Some(PublicOp::GetMediaFullPath),
        "select_media_data" => Some(PublicOp::SelectMediaData),
        "get_event_server" => Some(PublicOp::GetEventServer),
        _ => None,
    }
}

/// The generic data dispatch table.
pub(crate) fn data_table(operation: &str) -> Option<DataOp> {
    match operation {
        "find_one" => Some(DataOp::FindOne),
        "find" => Some(DataOp::Find),
        "summary" => Some(DataOp::Summary),
        "create" => Some(DataOp::Create),
        "update" => Some(DataOp::Update),
        "delete" => Some(DataOp::Delete),
        "fields" => Some(DataOp::Fields),
        "relation_fields" => Some(DataOp::RelationFields),
        "creation_require_fields" => Some(DataOp::CreationRequireFields),
        "tag" => Some(DataOp::Tag),
        _ => None,
    }
}
