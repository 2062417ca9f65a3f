/*!
A library for resolving the active build configurations of a Visual Studio
style multi-targeted project and loading the corresponding configured
projects exactly once per configuration key.

## Example: parsing a configuration full name

```
use projc::parse;

let configuration = parse::configuration("Debug|AnyCPU|net46").unwrap();

assert!(configuration.is_cross_targeting());
assert_eq!(Some("Debug"), configuration.dimension("Configuration"));
assert_eq!(Some("net46"), configuration.target_framework());
assert_eq!("Debug|AnyCPU|net46", configuration.full_name());
```
*/

#![warn(unused_extern_crates)]
#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod cache;
pub mod loader;
pub mod msbuild;
pub mod parse;
pub mod project;
pub mod resolver;
