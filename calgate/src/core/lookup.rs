//! Narrow lookup contracts consumed by the checkers.
//!
//! Header access and reference resolution are the only ways validation touches
//! the outside world. Both are traits so the checkers stay deterministic under
//! test and any failure they report can be propagated unchanged.

use anyhow::Result;

use crate::core::types::{CalSwitch, NOT_APPLICABLE, RefFile, RefKind, RefRole};

/// Read-only keyword access to an exposure header.
pub trait Header {
    /// Return the text value of `name`, or `None` when the keyword is absent.
    fn keyword(&self, name: &str) -> Result<Option<String>>;
}

/// Resolves a reference-file role into an existence/pedigree record.
///
/// When `switch` is supplied and the file has dummy pedigree, the resolver
/// downgrades it to `Omit` (see [`apply_pedigree`]). Passing `None` resolves
/// the file without any switch side effect.
pub trait ReferenceResolver {
    fn resolve_table<H: Header>(
        &self,
        header: &H,
        role: RefRole,
        switch: Option<&mut CalSwitch>,
    ) -> Result<RefFile>;

    fn resolve_image<H: Header>(
        &self,
        header: &H,
        role: RefRole,
        switch: Option<&mut CalSwitch>,
    ) -> Result<RefFile>;
}

/// Dispatch to the table or image resolver according to the role.
pub fn resolve<H: Header, R: ReferenceResolver>(
    resolver: &R,
    header: &H,
    role: RefRole,
    switch: Option<&mut CalSwitch>,
) -> Result<RefFile> {
    match role.kind() {
        RefKind::Table => resolver.resolve_table(header, role, switch),
        RefKind::Image => resolver.resolve_image(header, role, switch),
    }
}

/// Read a step switch as recorded in the header. Absent keywords read as `Omit`.
pub fn read_switch<H: Header>(header: &H, keyword: &str) -> Result<CalSwitch> {
    let value = header.keyword(keyword)?;
    Ok(value
        .as_deref()
        .map(CalSwitch::from_keyword)
        .unwrap_or(CalSwitch::Omit))
}

/// True unless `name` is blank or the `N/A` sentinel.
pub fn has_file_name(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && !name.eq_ignore_ascii_case(NOT_APPLICABLE)
}

/// Downgrade `switch` to `Omit` when `record` has dummy pedigree.
///
/// Only a switch that currently reads `Perform` is touched; switches are never
/// upgraded.
pub fn apply_pedigree(record: &RefFile, switch: Option<&mut CalSwitch>) {
    if let Some(switch) = switch
        && record.is_dummy()
        && switch.is_perform()
    {
        *switch = CalSwitch::Omit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Existence, Pedigree};
    use crate::test_support::header;

    #[test]
    fn has_file_name_rejects_blank_and_not_applicable() {
        assert!(!has_file_name(""));
        assert!(!has_file_name("   "));
        assert!(!has_file_name("N/A"));
        assert!(!has_file_name("n/a"));
        assert!(has_file_name("jref$abc_bia.fits"));
    }

    #[test]
    fn read_switch_defaults_to_omit_when_absent() {
        let hdr = header(&[("BIASCORR", "COMPLETE")]);
        assert_eq!(read_switch(&hdr, "BIASCORR").expect("read"), CalSwitch::Complete);
        assert_eq!(read_switch(&hdr, "SINKCORR").expect("read"), CalSwitch::Omit);
    }

    #[test]
    fn apply_pedigree_downgrades_only_perform_on_dummy() {
        let mut dummy = RefFile::unresolved(RefRole::AtodTab);
        dummy.exists = Existence::Yes;
        dummy.pedigree = Pedigree::Dummy;

        let mut switch = CalSwitch::Perform;
        apply_pedigree(&dummy, Some(&mut switch));
        assert_eq!(switch, CalSwitch::Omit);

        let mut complete = CalSwitch::Complete;
        apply_pedigree(&dummy, Some(&mut complete));
        assert_eq!(complete, CalSwitch::Complete);

        let good = RefFile {
            pedigree: Pedigree::Good,
            ..dummy
        };
        let mut switch = CalSwitch::Perform;
        apply_pedigree(&good, Some(&mut switch));
        assert_eq!(switch, CalSwitch::Perform);
    }
}
