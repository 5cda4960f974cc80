// Gemeinsames Schema-Modell fuer die Integrationstests.
//
// Wird per `include!` eingebunden. Benötigte Imports:
//   use yangtrack::qname::QName;
//   use yangtrack::schema::{ActionDefinition, IntegerKind, Module, SchemaContext, SchemaNode, TypeDefinition};
//
// Module:
// - ietf-interfaces: interfaces/interface[name] mit identityref `type`,
//   config-false `statistics` und der Action `reset`
// - ietf-ip: augmentiert interface um `ipv4!` mit address[ip] und der
//   Choice `subnet`
// - example-system: system mit leaf-list, enumeration, bits, decimal64,
//   binary und anyxml

const IF_NS: &str = "urn:ietf:params:xml:ns:yang:ietf-interfaces";
const IANAIFT_NS: &str = "urn:ietf:params:xml:ns:yang:iana-if-type";
const IP_NS: &str = "urn:ietf:params:xml:ns:yang:ietf-ip";
const SYS_NS: &str = "urn:example:system";

fn ifq(local: &str) -> QName {
    QName::new(IF_NS, local)
}

fn ipq(local: &str) -> QName {
    QName::new(IP_NS, local)
}

fn sysq(local: &str) -> QName {
    QName::new(SYS_NS, local)
}

fn uint(kind: IntegerKind) -> TypeDefinition {
    TypeDefinition::Integer(kind)
}

fn fixture_context() -> SchemaContext {
    let interface_type = TypeDefinition::IdentityRef {
        base: ifq("interface-type"),
        identities: vec![
            QName::new(IANAIFT_NS, "ethernetCsmacd"),
            QName::new(IANAIFT_NS, "softwareLoopback"),
        ],
    };

    let interface = SchemaNode::list(ifq("interface"), [ifq("name")])
        .with_child(SchemaNode::leaf(ifq("name"), TypeDefinition::String))
        .with_child(SchemaNode::leaf(ifq("description"), TypeDefinition::String))
        .with_child(SchemaNode::leaf(ifq("type"), interface_type).with_mandatory(true))
        .with_child(SchemaNode::leaf(ifq("enabled"), TypeDefinition::Boolean))
        .with_child(
            SchemaNode::container(ifq("statistics"))
                .with_config(false)
                .with_child(SchemaNode::leaf(ifq("in-octets"), uint(IntegerKind::Uint64))),
        )
        .with_action(
            ActionDefinition::new(ifq("reset"))
                .with_description("Reset the interface counters.")
                .with_input(SchemaNode::leaf(ifq("delay"), uint(IntegerKind::Uint32))),
        );

    let ipv4 = SchemaNode::container(ipq("ipv4"))
        .with_presence(true)
        .with_child(SchemaNode::leaf(ipq("enabled"), TypeDefinition::Boolean))
        .with_child(SchemaNode::leaf(ipq("mtu"), uint(IntegerKind::Uint16)))
        .with_child(
            SchemaNode::list(ipq("address"), [ipq("ip")])
                .with_child(SchemaNode::leaf(ipq("ip"), TypeDefinition::String))
                .with_child(
                    SchemaNode::choice(ipq("subnet"))
                        .with_mandatory(true)
                        .with_child(SchemaNode::leaf(ipq("prefix-length"), uint(IntegerKind::Uint8)))
                        .with_child(SchemaNode::leaf(ipq("netmask"), TypeDefinition::String)),
                ),
        );

    let system = SchemaNode::container(sysq("system"))
        .with_child(SchemaNode::leaf(sysq("hostname"), TypeDefinition::String))
        .with_child(SchemaNode::leaf_list(sysq("dns-server"), TypeDefinition::String))
        .with_child(SchemaNode::leaf(
            sysq("log-level"),
            TypeDefinition::enumeration(["emergency", "error", "info", "debug"]),
        ))
        .with_child(SchemaNode::leaf(sysq("features"), TypeDefinition::bits(["ntp", "ssh", "telnet"])))
        .with_child(SchemaNode::leaf(sysq("load"), TypeDefinition::Decimal64 { fraction_digits: 2 }))
        .with_child(SchemaNode::leaf(sysq("banner"), TypeDefinition::Binary))
        .with_child(SchemaNode::anyxml(sysq("vendor-data")));

    SchemaContext::builder()
        .module(
            Module::new("ietf-interfaces", "if", IF_NS)
                .with_revision("2018-02-20")
                .with_contact("WG List: <mailto:netmod@ietf.org>"),
        )
        .module(Module::new("iana-if-type", "ianaift", IANAIFT_NS).with_revision("2014-05-08"))
        .module(Module::new("ietf-ip", "ip", IP_NS).with_revision("2018-02-22"))
        .module(Module::new("example-system", "sys", SYS_NS))
        .node(SchemaNode::container(ifq("interfaces")).with_child(interface))
        .node(system)
        .augment([ifq("interfaces"), ifq("interface")], [ipv4])
        .build()
        .expect("fixture schema")
}

/// Two interfaces, one of them with ietf-ip configuration.
const INTERFACES_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<data xmlns="urn:ietf:params:xml:ns:netconf:base:1.0">
  <interfaces xmlns="urn:ietf:params:xml:ns:yang:ietf-interfaces"
              xmlns:ianaift="urn:ietf:params:xml:ns:yang:iana-if-type">
    <interface>
      <name>eth0</name>
      <type>ianaift:ethernetCsmacd</type>
      <enabled>true</enabled>
      <ipv4 xmlns="urn:ietf:params:xml:ns:yang:ietf-ip">
        <mtu>1500</mtu>
        <address>
          <ip>192.0.2.1</ip>
          <prefix-length>24</prefix-length>
        </address>
      </ipv4>
    </interface>
    <interface>
      <name>lo</name>
      <type>ianaift:softwareLoopback</type>
    </interface>
  </interfaces>
</data>
"#;

/// Operational view of one interface.
const STATISTICS_DOC: &str = r#"<data>
  <interfaces xmlns="urn:ietf:params:xml:ns:yang:ietf-interfaces">
    <interface>
      <name>eth0</name>
      <description>uplink</description>
      <statistics><in-octets>42</in-octets></statistics>
    </interface>
  </interfaces>
</data>
"#;

const SYSTEM_DOC: &str = r#"<data>
  <system xmlns="urn:example:system">
    <hostname>edge-1</hostname>
    <dns-server>192.0.2.53</dns-server>
    <dns-server>198.51.100.53</dns-server>
    <log-level>info</log-level>
    <features>ssh ntp</features>
    <load>0.50</load>
    <banner>aGVsbG8=</banner>
    <vendor-data><acme xmlns="urn:acme" level="3"><fan speed="high"/>ok</acme></vendor-data>
  </system>
</data>
"#;
