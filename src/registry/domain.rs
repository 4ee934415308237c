const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const PSN_NS: &str = "http://psn.ttp.ganimed.icmvc.emau.org/";
const CHECK_DIGIT_CLASS: &str = "org.emau.icmvc.ganimed.ttp.psn.generator.NoCheckDigits";
const ALPHABET: &str = "org.emau.icmvc.ganimed.ttp.psn.alphabets.Symbol32";
const PSN_LENGTH: u32 = 16;

/// A gPAS domain to be created with `addDomain`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainDefinition {
    pub name: String,
    pub psn_prefix: String,
    pub parent: Option<String>,
}

impl DomainDefinition {
    /// Project parent domain: `<project>`, prefix `PSN-<PROJECT>-`
    pub fn project(project: &str) -> Self {
        Self {
            name: project.to_string(),
            psn_prefix: format!("PSN-{}-", project.to_uppercase()),
            parent: None,
        }
    }

    /// Child domain `<project>-<name>`, prefix `PSN-<PROJECT>-<PREFIX>-`
    pub fn child(project: &str, name: &str, prefix: &str) -> Self {
        Self {
            name: format!("{}-{}", project, name),
            psn_prefix: format!(
                "PSN-{}-{}-",
                project.to_uppercase(),
                prefix.to_uppercase()
            ),
            parent: Some(project.to_string()),
        }
    }

    /// Fault string gPAS returns when the domain is already present
    pub fn already_exists_fault(&self) -> String {
        format!("domain {} already exists", self.name)
    }

    /// SOAP envelope for the `addDomain` operation
    pub fn to_soap(&self) -> String {
        let name = escape(&self.name);
        let parent = self
            .parent
            .as_deref()
            .map(|parent| format!("<parentDomainNames>{}</parentDomainNames>", escape(parent)))
            .unwrap_or_default();

        format!(
            concat!(
                r#"<soap:Envelope xmlns:soap="{ns}" xmlns:psn="{psn}">"#,
                "<soap:Header></soap:Header>",
                "<soap:Body><psn:addDomain><domainDTO>",
                "<name>{name}</name><label>{name}</label>",
                "<checkDigitClass>{check}</checkDigitClass>",
                "<alphabet>{alphabet}</alphabet>",
                "{parent}",
                "<config><psnLength>{length}</psnLength><psnPrefix>{prefix}</psnPrefix>",
                "<psnsDeletable>false</psnsDeletable></config>",
                "</domainDTO></psn:addDomain></soap:Body></soap:Envelope>"
            ),
            ns = SOAP_ENVELOPE_NS,
            psn = PSN_NS,
            name = name,
            check = CHECK_DIGIT_CLASS,
            alphabet = ALPHABET,
            parent = parent,
            length = PSN_LENGTH,
            prefix = escape(&self.psn_prefix),
        )
    }
}

/// Escape text for XML element content
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse of [`escape`] for the five predefined entities
pub(crate) fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Extract the `faultstring` of a SOAP fault, ignoring namespace prefixes
pub(crate) fn fault_string(body: &str) -> Option<String> {
    let start_tag = find_open_tag(body, "faultstring")?;
    let content_start = start_tag + body[start_tag..].find('>')? + 1;
    let rest = &body[content_start..];
    let end = rest.find("</")?;
    Some(unescape(rest[..end].trim()))
}

fn find_open_tag(body: &str, local_name: &str) -> Option<usize> {
    let mut offset = 0;
    while let Some(pos) = body[offset..].find('<') {
        let tag_start = offset + pos;
        let tag = &body[tag_start + 1..];
        let name_end = tag
            .find(|c: char| c == '>' || c == '/' || c.is_whitespace())
            .unwrap_or(tag.len());
        let name = &tag[..name_end];
        let local = name.rsplit(':').next().unwrap_or(name);
        if local == local_name {
            return Some(tag_start);
        }
        offset = tag_start + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_domain_has_no_parent() {
        let domain = DomainDefinition::project("study");
        assert_eq!(domain.name, "study");
        assert_eq!(domain.psn_prefix, "PSN-STUDY-");
        assert_eq!(domain.parent, None);
    }

    #[test]
    fn child_domain_is_attached_to_project() {
        let domain = DomainDefinition::child("study", "patient", "pat");
        assert_eq!(domain.name, "study-patient");
        assert_eq!(domain.psn_prefix, "PSN-STUDY-PAT-");
        assert_eq!(domain.parent.as_deref(), Some("study"));
    }

    #[test]
    fn soap_envelope_contains_domain_settings() {
        let xml = DomainDefinition::child("study", "patient", "pat").to_soap();

        assert!(xml.starts_with("<soap:Envelope"));
        assert!(xml.contains("<name>study-patient</name><label>study-patient</label>"));
        assert!(xml.contains("<checkDigitClass>org.emau.icmvc.ganimed.ttp.psn.generator.NoCheckDigits</checkDigitClass>"));
        assert!(xml.contains("<alphabet>org.emau.icmvc.ganimed.ttp.psn.alphabets.Symbol32</alphabet>"));
        assert!(xml.contains("<parentDomainNames>study</parentDomainNames>"));
        assert!(xml.contains("<psnLength>16</psnLength>"));
        assert!(xml.contains("<psnPrefix>PSN-STUDY-PAT-</psnPrefix>"));
        assert!(xml.contains("<psnsDeletable>false</psnsDeletable>"));
    }

    #[test]
    fn parent_precedes_config_in_envelope() {
        let xml = DomainDefinition::child("study", "patient", "pat").to_soap();

        let alphabet = xml.find("</alphabet>").unwrap();
        let parent = xml.find("<parentDomainNames>").unwrap();
        let config = xml.find("<config>").unwrap();
        assert!(alphabet < parent && parent < config);
        assert!(xml.ends_with("</domainDTO></psn:addDomain></soap:Body></soap:Envelope>"));
    }

    #[test]
    fn project_envelope_omits_parent() {
        let xml = DomainDefinition::project("study").to_soap();
        assert!(!xml.contains("parentDomainNames"));
    }

    #[test]
    fn escapes_markup_in_names() {
        let xml = DomainDefinition::project("a<b&c").to_soap();
        assert!(xml.contains("<name>a&lt;b&amp;c</name>"));
    }

    #[test]
    fn reads_namespaced_fault_string() {
        let body = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
            <soap:Body><soap:Fault>
              <faultcode>soap:Server</faultcode>
              <faultstring>domain study already exists</faultstring>
            </soap:Fault></soap:Body></soap:Envelope>"#;

        assert_eq!(
            fault_string(body).as_deref(),
            Some("domain study already exists")
        );
    }

    #[test]
    fn fault_string_absent() {
        assert_eq!(fault_string("<html>Internal Server Error</html>"), None);
        assert_eq!(fault_string(""), None);
    }

    #[test]
    fn unescape_reverses_escape() {
        assert_eq!(unescape(&escape("a<b>&\"c'")), "a<b>&\"c'");
    }
}
