//! Read-only document protection.

use super::{xml, DocxPackage, XmlElement, XmlNode};
use crate::error::{Error, Result};

const PROTECTION: &str = "w:documentProtection";

/// Settings children that precede `w:documentProtection` in schema order.
const PRECEDING_SETTINGS: &[&str] = &[
    "w:writeProtection",
    "w:view",
    "w:zoom",
    "w:removePersonalInformation",
    "w:removeDateAndTime",
    "w:doNotDisplayPageBoundaries",
    "w:displayBackgroundShape",
    "w:printPostScriptOverText",
    "w:printFractionalCharacterWidth",
    "w:printFormsData",
    "w:embedTrueTypeFonts",
    "w:embedSystemFonts",
    "w:saveSubsetFonts",
    "w:saveFormsData",
    "w:mirrorMargins",
    "w:alignBordersAndEdges",
    "w:bordersDoNotSurroundHeader",
    "w:bordersDoNotSurroundFooter",
    "w:gutterAtTop",
    "w:hideSpellingErrors",
    "w:hideGrammaticalErrors",
    "w:activeWritingStyle",
    "w:proofState",
    "w:formsDesign",
    "w:attachedTemplate",
    "w:linkStyles",
    "w:stylePaneFormatFilter",
    "w:stylePaneSortMethod",
    "w:documentType",
    "w:mailMerge",
    "w:revisionView",
    "w:trackRevisions",
    "w:doNotTrackMoves",
    "w:doNotTrackFormatting",
];

/// Mark the package as read-only with enforcement on.
///
/// Any existing protection element is replaced.
pub fn apply_read_only(package: &mut DocxPackage) -> Result<()> {
    let name = package
        .settings_name()?
        .ok_or_else(|| Error::Protection("package has no settings part".to_string()))?;
    let data = package
        .part(&name)
        .ok_or_else(|| Error::Protection(format!("settings part {name} is unreadable")))?;

    let mut settings = xml::parse(data)?;
    if settings.local_name() != "settings" {
        return Err(Error::Protection(format!(
            "unexpected settings root <{}>",
            settings.name
        )));
    }
    set_read_only(&mut settings);
    package.set_part(&name, xml::write(&settings)?);
    Ok(())
}

fn set_read_only(settings: &mut XmlElement) {
    settings
        .children
        .retain(|c| !matches!(c, XmlNode::Element(e) if e.name == PROTECTION));

    let position = settings
        .children
        .iter()
        .rposition(|c| matches!(c, XmlNode::Element(e) if PRECEDING_SETTINGS.contains(&e.name.as_str())))
        .map_or(0, |i| i + 1);

    let protection = XmlElement::new(PROTECTION)
        .with_attr("w:edit", "readOnly")
        .with_attr("w:enforcement", "1");
    settings
        .children
        .insert(position, XmlNode::Element(protection));
}

/// Whether the settings element enforces read-only editing.
pub fn is_read_only(settings: &XmlElement) -> bool {
    settings.child(PROTECTION).is_some_and(|p| {
        p.attr("w:edit") == Some("readOnly")
            && matches!(p.attr("w:enforcement"), Some("1") | Some("true") | Some("on"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(children: &[&str]) -> XmlElement {
        children
            .iter()
            .fold(XmlElement::new("w:settings"), |s, name| s.with_child(XmlElement::new(*name)))
    }

    fn names(element: &XmlElement) -> Vec<&str> {
        element.elements().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_inserted_after_preceding_elements() {
        let mut s = settings(&["w:zoom", "w:proofState", "w:defaultTabStop", "w:compat"]);
        set_read_only(&mut s);
        assert_eq!(
            names(&s),
            vec!["w:zoom", "w:proofState", PROTECTION, "w:defaultTabStop", "w:compat"]
        );
        assert!(is_read_only(&s));
    }

    #[test]
    fn test_inserted_first_when_nothing_precedes() {
        let mut s = settings(&["w:defaultTabStop"]);
        set_read_only(&mut s);
        assert_eq!(names(&s), vec![PROTECTION, "w:defaultTabStop"]);
    }

    #[test]
    fn test_existing_protection_replaced() {
        let mut s = XmlElement::new("w:settings")
            .with_child(XmlElement::new("w:zoom"))
            .with_child(XmlElement::new(PROTECTION).with_attr("w:edit", "comments"));
        assert!(!is_read_only(&s));

        set_read_only(&mut s);
        assert_eq!(names(&s), vec!["w:zoom", PROTECTION]);
        assert!(is_read_only(&s));
    }
}
