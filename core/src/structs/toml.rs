use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SamToml {
    pub output: Output,
    pub sam: SamOptions,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Output {
    pub name: String,
    pub directory: String,
    /**Either `json` or `jsonl` */
    pub format: String,
    pub compress: bool,
    pub logging: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SamOptions {
    /**Path to a JSON registry export of the SAM hive */
    pub export: String,
    /**Defaults to `SAM\Domains\Account\Users` */
    pub accounts_path: Option<String>,
    /**Defaults to `SAM\Domains\Builtin\Aliases` */
    pub groups_path: Option<String>,
    /**Fail the whole record on the first field that cannot be decoded */
    pub strict_fields: Option<bool>,
    /**Encoding of embedded strings. `utf16` (default) or `utf8` */
    pub encoding: Option<String>,
    /**Decode accounts and groups on separate threads */
    pub parallel: Option<bool>,
}
