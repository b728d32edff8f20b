use syn::meta::ParseNestedMeta;
use syn::{Expr, Result};

#[derive(Default)]
pub struct ProviderAttributes {
    pub is_primary: bool,
    pub is_manual: bool,
    pub priority: Option<Expr>,
}

impl ProviderAttributes {
    pub fn parse(&mut self, meta: ParseNestedMeta) -> Result<()> {
        if meta.path.is_ident("primary") {
            self.is_primary = true;
        } else if meta.path.is_ident("manual") {
            self.is_manual = true;
        } else if meta.path.is_ident("priority") {
            self.priority = Some(meta.value()?.parse()?);
        } else {
            return Err(meta.error("Unsupported provider property!"));
        }

        Ok(())
    }
}
