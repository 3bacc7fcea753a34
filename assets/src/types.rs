//! The closed set of asset types the CMS knows about.
//!
//! Every [TypeTag] has the tag string used on the wire, the property name a
//! payload nests the asset record under, and (for contained types) the type
//! of container it lives in.
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::Error;

macro_rules! type_tags {
    ($($variant:ident => ($tag:literal, $property:literal, $parent:expr, $container:literal)),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr)]
        pub enum TypeTag {
            $($variant,)*
        }

        impl TypeTag {
            /// All known tags, in registry order.
            pub const ALL: &'static [TypeTag] = &[$(TypeTag::$variant,)*];

            /// The tag string used by the service.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(TypeTag::$variant => $tag,)*
                }
            }

            /// The key a payload nests the asset record under.
            pub fn property_name(&self) -> &'static str {
                match self {
                    $(TypeTag::$variant => $property,)*
                }
            }

            /// The type of container an asset of this type is listed in.
            /// Containers nest in containers of their own type.
            pub fn parent_container(&self) -> Option<TypeTag> {
                match self {
                    $(TypeTag::$variant => $parent,)*
                }
            }

            /// Whether assets of this type carry a child listing.
            pub fn is_container(&self) -> bool {
                match self {
                    $(TypeTag::$variant => $container,)*
                }
            }
        }
    };
}

type_tags! {
    AssetFactory => ("assetfactory", "assetFactory", Some(TypeTag::AssetFactoryContainer), false),
    AssetFactoryContainer => ("assetfactorycontainer", "assetFactoryContainer", Some(TypeTag::AssetFactoryContainer), true),
    FeedBlock => ("block_FEED", "feedBlock", Some(TypeTag::Folder), false),
    IndexBlock => ("block_INDEX", "indexBlock", Some(TypeTag::Folder), false),
    TextBlock => ("block_TEXT", "textBlock", Some(TypeTag::Folder), false),
    TwitterFeedBlock => ("block_TWITTER_FEED", "twitterFeedBlock", Some(TypeTag::Folder), false),
    XhtmlDataDefinitionBlock => ("block_XHTML_DATADEFINITION", "xhtmlDataDefinitionBlock", Some(TypeTag::Folder), false),
    XmlBlock => ("block_XML", "xmlBlock", Some(TypeTag::Folder), false),
    ConnectorContainer => ("connectorcontainer", "connectorContainer", Some(TypeTag::ConnectorContainer), true),
    FacebookConnector => ("facebookconnector", "facebookConnector", Some(TypeTag::ConnectorContainer), false),
    GoogleAnalyticsConnector => ("googleanalyticsconnector", "googleAnalyticsConnector", Some(TypeTag::ConnectorContainer), false),
    TwitterConnector => ("twitterconnector", "twitterConnector", Some(TypeTag::ConnectorContainer), false),
    WordPressConnector => ("wordpressconnector", "wordPressConnector", Some(TypeTag::ConnectorContainer), false),
    ContentType => ("contenttype", "contentType", Some(TypeTag::ContentTypeContainer), false),
    ContentTypeContainer => ("contenttypecontainer", "contentTypeContainer", Some(TypeTag::ContentTypeContainer), true),
    DataDefinition => ("datadefinition", "dataDefinition", Some(TypeTag::DataDefinitionContainer), false),
    DataDefinitionContainer => ("datadefinitioncontainer", "dataDefinitionContainer", Some(TypeTag::DataDefinitionContainer), true),
    Destination => ("destination", "destination", Some(TypeTag::SiteDestinationContainer), false),
    EditorConfiguration => ("editorconfiguration", "editorConfiguration", None, false),
    File => ("file", "file", Some(TypeTag::Folder), false),
    Folder => ("folder", "folder", Some(TypeTag::Folder), true),
    ScriptFormat => ("format_SCRIPT", "scriptFormat", Some(TypeTag::Folder), false),
    XsltFormat => ("format_XSLT", "xsltFormat", Some(TypeTag::Folder), false),
    Group => ("group", "group", None, false),
    Message => ("message", "message", None, false),
    MetadataSet => ("metadataset", "metadataSet", Some(TypeTag::MetadataSetContainer), false),
    MetadataSetContainer => ("metadatasetcontainer", "metadataSetContainer", Some(TypeTag::MetadataSetContainer), true),
    Page => ("page", "page", Some(TypeTag::Folder), false),
    PageConfigurationSet => ("pageconfigurationset", "pageConfigurationSet", Some(TypeTag::PageConfigurationSetContainer), false),
    PageConfigurationSetContainer => ("pageconfigurationsetcontainer", "pageConfigurationSetContainer", Some(TypeTag::PageConfigurationSetContainer), true),
    PublishSet => ("publishset", "publishSet", Some(TypeTag::PublishSetContainer), false),
    PublishSetContainer => ("publishsetcontainer", "publishSetContainer", Some(TypeTag::PublishSetContainer), true),
    Reference => ("reference", "reference", Some(TypeTag::Folder), false),
    Role => ("role", "role", None, false),
    SharedField => ("sharedfield", "sharedField", Some(TypeTag::SharedFieldContainer), false),
    SharedFieldContainer => ("sharedfieldcontainer", "sharedFieldContainer", Some(TypeTag::SharedFieldContainer), true),
    Site => ("site", "site", None, false),
    SiteDestinationContainer => ("sitedestinationcontainer", "siteDestinationContainer", Some(TypeTag::SiteDestinationContainer), true),
    Symlink => ("symlink", "symlink", Some(TypeTag::Folder), false),
    Template => ("template", "template", Some(TypeTag::Folder), false),
    CloudTransport => ("transport_cloud", "cloudTransport", Some(TypeTag::TransportContainer), false),
    DatabaseTransport => ("transport_db", "databaseTransport", Some(TypeTag::TransportContainer), false),
    FileSystemTransport => ("transport_fs", "fileSystemTransport", Some(TypeTag::TransportContainer), false),
    FtpTransport => ("transport_ftp", "ftpTransport", Some(TypeTag::TransportContainer), false),
    TransportContainer => ("transportcontainer", "transportContainer", Some(TypeTag::TransportContainer), true),
    User => ("user", "user", None, false),
    WorkflowDefinition => ("workflowdefinition", "workflowDefinition", Some(TypeTag::WorkflowDefinitionContainer), false),
    WorkflowDefinitionContainer => ("workflowdefinitioncontainer", "workflowDefinitionContainer", Some(TypeTag::WorkflowDefinitionContainer), true),
    WorkflowEmail => ("workflowemail", "workflowEmail", Some(TypeTag::WorkflowEmailContainer), false),
    WorkflowEmailContainer => ("workflowemailcontainer", "workflowEmailContainer", Some(TypeTag::WorkflowEmailContainer), true),
}

impl TypeTag {
    pub const BLOCK_TYPES: &'static [TypeTag] = &[
        TypeTag::FeedBlock,
        TypeTag::IndexBlock,
        TypeTag::TextBlock,
        TypeTag::TwitterFeedBlock,
        TypeTag::XhtmlDataDefinitionBlock,
        TypeTag::XmlBlock,
    ];

    pub const FORMAT_TYPES: &'static [TypeTag] = &[TypeTag::ScriptFormat, TypeTag::XsltFormat];

    pub const TRANSPORT_TYPES: &'static [TypeTag] = &[
        TypeTag::CloudTransport,
        TypeTag::DatabaseTransport,
        TypeTag::FileSystemTransport,
        TypeTag::FtpTransport,
    ];

    pub const CONNECTOR_TYPES: &'static [TypeTag] = &[
        TypeTag::FacebookConnector,
        TypeTag::GoogleAnalyticsConnector,
        TypeTag::TwitterConnector,
        TypeTag::WordPressConnector,
    ];

    /// Looks up the tag whose payload property is `property`.
    pub fn from_property_name(property: &str) -> Option<TypeTag> {
        Self::ALL
            .iter()
            .find(|t| t.property_name() == property)
            .copied()
    }

    /// Whether the service accepts publish requests for this type.
    pub fn is_publishable(&self) -> bool {
        matches!(
            self,
            TypeTag::File | TypeTag::Folder | TypeTag::Page | TypeTag::PublishSet | TypeTag::Site
        )
    }
}

impl std::str::FromStr for TypeTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| Error::InvalidRequest(format!("unknown asset type: {}", s)))
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
